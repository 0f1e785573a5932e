//! Status Queries - 服务信息与健康状态

/// 服务信息查询
#[derive(Debug, Clone)]
pub struct GetServiceInfo;

/// 健康状态查询
#[derive(Debug, Clone)]
pub struct GetHealth;

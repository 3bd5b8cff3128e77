//! HTTP 中间件
//! 请求追踪、IP 白名单

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// 应用状态
///
/// 服务使用 Arc 包装，多个请求共享实例，Clone 成本低廉
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::AppConfig,
    pub db: sqlx::SqlitePool,
    pub access_service: Arc<crate::services::AccessService>,
    pub auth_service: Arc<crate::services::AuthService>,
    pub stats_service: Arc<crate::services::StatsService>,
    pub jwt_service: Arc<crate::auth::jwt::JwtService>,
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    // 生成或提取 trace_id/request_id
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let uri = req.uri().to_string();

    // 创建 span
    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    async move {
        let start = Instant::now();

        let response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        // 记录指标 - 使用静态字符串
        let method_name = match method.as_str() {
            "GET" => "GET",
            "POST" => "POST",
            "PUT" => "PUT",
            "DELETE" => "DELETE",
            "PATCH" => "PATCH",
            _ => "UNKNOWN",
        };
        let status_code = match status {
            200 => "200",
            201 => "201",
            204 => "204",
            400 => "400",
            401 => "401",
            403 => "403",
            404 => "404",
            500 => "500",
            _ => "other",
        };

        metrics::counter!("http_requests_total", "method" => method_name, "status" => status_code)
            .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        // 记录日志
        tracing::info!(
            method = %method,
            uri = %uri,
            status = status,
            elapsed_ms = elapsed.as_millis(),
            "Request completed"
        );

        // 在响应头中添加 trace_id
        let mut response = response;
        if let Ok(value) = trace_id.parse() {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = request_id.parse() {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// IP 白名单中间件
pub async fn ip_whitelist_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, crate::error::AppError> {
    if let Some(allowed_ips) = &state.config.security.allowed_ips {
        let client_ip = get_client_ip(&req, state.config.security.trust_proxy);

        if !allowed_ips.contains(&client_ip) {
            tracing::warn!(
                client_ip = %client_ip,
                "IP not in whitelist"
            );
            return Err(crate::error::AppError::Forbidden);
        }

        tracing::debug!(client_ip = %client_ip, "IP allowed by whitelist");
    }

    Ok(next.run(req).await)
}

/// 获取客户端 IP 地址
fn get_client_ip(req: &Request, trust_proxy: bool) -> String {
    let headers = req.headers();

    // 如果信任代理，从 X-Forwarded-For 获取
    if trust_proxy {
        if let Some(forwarded_for) = headers.get("x-forwarded-for") {
            if let Ok(forwarded_str) = forwarded_for.to_str() {
                // X-Forwarded-For 可能包含多个 IP，取第一个
                if let Some(first_ip) = forwarded_str.split(',').next() {
                    return first_ip.trim().to_string();
                }
            }
        }

        // 尝试 X-Real-IP
        if let Some(real_ip) = headers.get("x-real-ip") {
            if let Ok(ip_str) = real_ip.to_str() {
                return ip_str.to_string();
            }
        }
    }

    "unknown".to_string()
}

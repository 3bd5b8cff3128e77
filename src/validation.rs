//! IP 与端口校验
//! 所有防火墙/SSH 变更操作在触碰驱动或数据库之前必须先通过这里的校验，
//! 同时防止把未经检查的字符串拼进 ufw 命令行

use once_cell::sync::Lazy;
use regex::Regex;

/// IPv4 地址，可选 CIDR 后缀
static IPV4_CIDR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,3})\.(\d{1,3})\.(\d{1,3})\.(\d{1,3})(/(\d{1,2}))?$")
        .expect("invalid IPv4 regex")
});

/// 校验 IPv4 地址（可带 /0–/32 的 CIDR 后缀）
///
/// 只接受点分十进制 IPv4；IPv6、主机名、空串一律返回 false。
pub fn is_valid_ip_address(ip: &str) -> bool {
    let captures = match IPV4_CIDR_RE.captures(ip) {
        Some(c) => c,
        None => return false,
    };

    // 每个八位组必须在 [0, 255]
    for i in 1..=4 {
        let octet = captures.get(i).map(|m| m.as_str()).unwrap_or("");
        match octet.parse::<u32>() {
            Ok(n) if n <= 255 => {}
            _ => return false,
        }
    }

    // CIDR 掩码必须在 [0, 32]
    if let Some(mask) = captures.get(6) {
        match mask.as_str().parse::<u32>() {
            Ok(n) if n <= 32 => {}
            _ => return false,
        }
    }

    true
}

/// 校验端口：字面量 "any" 或 [1, 65535] 内的整数
pub fn is_valid_port(port: &str) -> bool {
    if port == "any" {
        return true;
    }

    matches!(port.parse::<u32>(), Ok(n) if (1..=65535).contains(&n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ip_addresses() {
        assert!(is_valid_ip_address("192.168.1.1"));
        assert!(is_valid_ip_address("0.0.0.0"));
        assert!(is_valid_ip_address("255.255.255.255"));
        assert!(is_valid_ip_address("203.0.113.5"));
    }

    #[test]
    fn test_valid_cidr_blocks() {
        assert!(is_valid_ip_address("192.168.1.0/24"));
        assert!(is_valid_ip_address("10.0.0.0/0"));
        assert!(is_valid_ip_address("172.16.0.0/32"));
    }

    #[test]
    fn test_invalid_ip_addresses() {
        assert!(!is_valid_ip_address("256.1.1.1"));
        assert!(!is_valid_ip_address("192.168.1"));
        assert!(!is_valid_ip_address("192.168.1.1.1"));
        assert!(!is_valid_ip_address("not-an-ip"));
        assert!(!is_valid_ip_address(""));
        assert!(!is_valid_ip_address("::1"));
        assert!(!is_valid_ip_address("host.example.com"));
        // 拒绝命令注入尝试
        assert!(!is_valid_ip_address("1.2.3.4; rm -rf /"));
    }

    #[test]
    fn test_invalid_cidr_masks() {
        assert!(!is_valid_ip_address("192.168.1.0/33"));
        assert!(!is_valid_ip_address("192.168.1.0/99"));
        assert!(!is_valid_ip_address("192.168.1.0/"));
    }

    #[test]
    fn test_valid_ports() {
        assert!(is_valid_port("any"));
        assert!(is_valid_port("1"));
        assert!(is_valid_port("22"));
        assert!(is_valid_port("2222"));
        assert!(is_valid_port("65535"));
    }

    #[test]
    fn test_invalid_ports() {
        assert!(!is_valid_port("0"));
        assert!(!is_valid_port("65536"));
        assert!(!is_valid_port("-1"));
        assert!(!is_valid_port("not-a-port"));
        assert!(!is_valid_port(""));
        assert!(!is_valid_port("ANY"));
    }
}

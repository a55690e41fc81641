/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: 保護された route に Authentication Gateway を掛ける
 * - cors / http / security_headers: 全 route 共通
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;

//! QR encoding boundary.
//!
//! Wraps the `qrcodegen` encoder: payloads go in, a bare [`Matrix`]
//! comes out. The quiet zone is not baked into the matrix; it is applied
//! as a coordinate offset by the emitter via `RenderConfig.border`.

use std::fmt;
use std::str::FromStr;

use qrcodegen::{QrCode, QrCodeEcc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matrix::Matrix;

// ── Errors ────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("payload does not fit in any QR version: {0}")]
    DataTooLong(#[from] qrcodegen::DataTooLong),

    #[error("unknown error correction level '{0}', expected low, medium, quartile, or high")]
    UnknownLevel(String),

    #[error("unknown Wi-Fi auth '{0}', expected WEP, WPA, WPA2, WPA/WPA2, or nopass")]
    InvalidAuth(String),
}

// ── Error correction ──────────────────────────────────────────────────

/// QR error correction level. Opaque encoder input; higher levels add
/// redundancy at the cost of symbol size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCorrection {
    Low,
    Medium,
    Quartile,
    High,
}

impl ErrorCorrection {
    fn ecc(self) -> QrCodeEcc {
        match self {
            ErrorCorrection::Low => QrCodeEcc::Low,
            ErrorCorrection::Medium => QrCodeEcc::Medium,
            ErrorCorrection::Quartile => QrCodeEcc::Quartile,
            ErrorCorrection::High => QrCodeEcc::High,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ErrorCorrection::Low => "low",
            ErrorCorrection::Medium => "medium",
            ErrorCorrection::Quartile => "quartile",
            ErrorCorrection::High => "high",
        }
    }
}

impl Default for ErrorCorrection {
    fn default() -> Self {
        ErrorCorrection::Medium
    }
}

impl FromStr for ErrorCorrection {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(ErrorCorrection::Low),
            "medium" => Ok(ErrorCorrection::Medium),
            "quartile" => Ok(ErrorCorrection::Quartile),
            "high" => Ok(ErrorCorrection::High),
            _ => Err(EncodeError::UnknownLevel(s.to_string())),
        }
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Encoding ──────────────────────────────────────────────────────────

/// Encode UTF-8 text into a module matrix.
pub fn encode_text(text: &str, level: ErrorCorrection) -> Result<Matrix, EncodeError> {
    let qr = QrCode::encode_text(text, level.ecc())?;
    Ok(matrix_from_qr(&qr))
}

/// Encode raw bytes into a module matrix.
pub fn encode_binary(data: &[u8], level: ErrorCorrection) -> Result<Matrix, EncodeError> {
    let qr = QrCode::encode_binary(data, level.ecc())?;
    Ok(matrix_from_qr(&qr))
}

fn matrix_from_qr(qr: &QrCode) -> Matrix {
    let size = qr.size() as usize;
    let mut matrix = Matrix::new(size);
    for row in 0..size {
        for col in 0..size {
            if qr.get_module(col as i32, row as i32) {
                matrix.set(row, col, true);
            }
        }
    }
    log::debug!(
        "encoded {}x{} symbol, {} dark modules",
        size,
        size,
        matrix.dark_count()
    );
    matrix
}

// ── Wi-Fi payload composer ────────────────────────────────────────────

/// Wi-Fi network authentication type for the `WIFI:` payload scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WifiAuth {
    Wep,
    Wpa,
    Wpa2,
    WpaWpa2,
    Nopass,
}

impl WifiAuth {
    fn tag(self) -> &'static str {
        match self {
            WifiAuth::Wep => "WEP",
            WifiAuth::Wpa => "WPA",
            WifiAuth::Wpa2 => "WPA2",
            WifiAuth::WpaWpa2 => "WPA/WPA2",
            WifiAuth::Nopass => "NOPASS",
        }
    }
}

impl FromStr for WifiAuth {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wep" => Ok(WifiAuth::Wep),
            "wpa" => Ok(WifiAuth::Wpa),
            "wpa2" => Ok(WifiAuth::Wpa2),
            "wpa/wpa2" => Ok(WifiAuth::WpaWpa2),
            "nopass" => Ok(WifiAuth::Nopass),
            _ => Err(EncodeError::InvalidAuth(s.to_string())),
        }
    }
}

/// Compose a `WIFI:` connection payload.
///
/// Backslash, semicolon, comma, and colon are escaped per the scheme;
/// `Nopass` networks drop the password entirely.
pub fn wifi_payload(ssid: &str, password: &str, auth: WifiAuth, hidden: bool) -> String {
    let password = if auth == WifiAuth::Nopass {
        String::new()
    } else {
        escape_wifi(password)
    };
    format!(
        "WIFI:T:{};S:{};P:{};H:{};;",
        auth.tag(),
        escape_wifi(ssid),
        password,
        hidden
    )
}

fn escape_wifi(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | ';' | ',' | ':') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_text_produces_valid_symbol() {
        let matrix = encode_text("https://example.com", ErrorCorrection::Medium).unwrap();
        // Version 1 is 21x21; each version adds 4.
        assert!(matrix.size() >= 21);
        assert_eq!((matrix.size() - 21) % 4, 0);
        assert!(matrix.dark_count() > 0);
        // Finder corner modules are always dark.
        assert!(matrix.get(0, 0));
        assert!(matrix.get(0, matrix.size() - 1));
        assert!(matrix.get(matrix.size() - 1, 0));
    }

    #[test]
    fn test_encode_binary_matches_text_for_ascii() {
        let a = encode_text("qrcad", ErrorCorrection::Low).unwrap();
        let b = encode_binary(b"qrcad", ErrorCorrection::Low).unwrap();
        // Byte-mode segments may differ from text-mode segments, but
        // both must be valid square symbols.
        assert!(a.size() >= 21);
        assert!(b.size() >= 21);
    }

    #[test]
    fn test_oversized_payload_is_rejected() {
        let huge = "x".repeat(10_000);
        match encode_text(&huge, ErrorCorrection::High) {
            Err(EncodeError::DataTooLong(_)) => {}
            other => panic!("expected DataTooLong, got {other:?}"),
        }
    }

    #[test]
    fn test_ecc_level_parsing() {
        assert_eq!("low".parse::<ErrorCorrection>().unwrap(), ErrorCorrection::Low);
        assert_eq!("HIGH".parse::<ErrorCorrection>().unwrap(), ErrorCorrection::High);
        assert_eq!(
            "Quartile".parse::<ErrorCorrection>().unwrap(),
            ErrorCorrection::Quartile
        );
        assert!("ultra".parse::<ErrorCorrection>().is_err());
    }

    #[test]
    fn test_wifi_payload_format() {
        let payload = wifi_payload("home", "hunter2", WifiAuth::Wpa, false);
        assert_eq!(payload, "WIFI:T:WPA;S:home;P:hunter2;H:false;;");
    }

    #[test]
    fn test_wifi_payload_escapes_reserved_characters() {
        let payload = wifi_payload("a;b", "c:d,e\\f", WifiAuth::Wpa2, true);
        assert_eq!(payload, "WIFI:T:WPA2;S:a\\;b;P:c\\:d\\,e\\\\f;H:true;;");
    }

    #[test]
    fn test_wifi_nopass_drops_password() {
        let payload = wifi_payload("cafe", "ignored", WifiAuth::Nopass, false);
        assert_eq!(payload, "WIFI:T:NOPASS;S:cafe;P:;H:false;;");
    }

    #[test]
    fn test_wifi_auth_parsing() {
        assert_eq!("wpa/wpa2".parse::<WifiAuth>().unwrap(), WifiAuth::WpaWpa2);
        assert_eq!("NOPASS".parse::<WifiAuth>().unwrap(), WifiAuth::Nopass);
        assert!("open".parse::<WifiAuth>().is_err());
    }
}

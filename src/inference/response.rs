//! Response building: probability → percentage + advisory message.

use serde_json::{Value, json};

use crate::config::ResponseKeys;

/// Advisory for risk strictly above the threshold.
pub const HIGH_RISK_MESSAGE: &str = "Alerta: Cita clínica inmediata.";
/// Advisory for risk at or below the threshold.
pub const LOW_RISK_MESSAGE: &str = "Recomendación de seguimiento/chequeos.";
/// Percentage above which the high-risk advisory is chosen.
pub const RISK_THRESHOLD_PERCENT: f64 = 50.0;

/// A finished prediction, ready to send back.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub probability: f64,
    pub risk_percent: f64,
    pub message: &'static str,
}

impl RiskAssessment {
    pub fn is_high_risk(&self) -> bool {
        self.message == HIGH_RISK_MESSAGE
    }

    /// Render with the configured key set.
    pub fn to_json(&self, keys: ResponseKeys) -> Value {
        match keys {
            ResponseKeys::English => json!({
                "risk_percent": self.risk_percent,
                "message": self.message,
                "probability": self.probability,
            }),
            ResponseKeys::Spanish => json!({
                "riesgo_porcentaje": self.risk_percent,
                "mensaje_accion": self.message,
                "probabilidad": self.probability,
            }),
        }
    }
}

/// Round to two decimal places from the exact binary value of `x`.
///
/// Scaling by 100 first would round twice: `0.015` is stored just below
/// `0.015` but `0.015 * 100.0` lands exactly on `1.5`.
fn round2(x: f64) -> f64 {
    format!("{x:.2}").parse().unwrap_or(x)
}

/// The threshold applies to the unrounded percentage, so any probability
/// strictly above 0.5 is high risk even when it displays as `50.0`.
pub fn build_response(probability: f64) -> RiskAssessment {
    let percent = probability * 100.0;
    let risk_percent = round2(percent);
    let message = if percent > RISK_THRESHOLD_PERCENT {
        HIGH_RISK_MESSAGE
    } else {
        LOW_RISK_MESSAGE
    };
    RiskAssessment {
        probability,
        risk_percent,
        message,
    }
}

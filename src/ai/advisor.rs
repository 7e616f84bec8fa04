use crate::{
    core::{geo::GeoPoint, proximity::ProductWithSupplier},
    errors::{Error, Result},
};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tracing::{debug, warn};

use super::provider::{Prompt, RecommendationProvider};

const RECOMMENDATIONS_UNAVAILABLE: &str = "AI recommendations temporarily unavailable";
const QUALITY_UNAVAILABLE: &str = "Quality analysis temporarily unavailable";
const NEGOTIATION_UNAVAILABLE: &str = "Negotiation assistance temporarily unavailable";

/// How quickly the vendor needs stock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

impl Urgency {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Input for supplier recommendations
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    /// Asking vendor, used for logging only
    #[serde(default)]
    pub vendor_id: Option<i64>,
    /// Product category wanted
    pub category: String,
    /// Vendor latitude
    pub latitude: f64,
    /// Vendor longitude
    pub longitude: f64,
    #[serde(default)]
    pub urgency: Urgency,
}

/// Advisory supplier recommendations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    /// Whatever the model recommended, passed through as JSON
    #[serde(default)]
    pub recommendations: Vec<Value>,
    #[serde(default)]
    pub message: Option<String>,
    /// False when this is a fallback rather than a model answer
    #[serde(default)]
    pub available: bool,
}

/// Input for a produce quality check
#[derive(Debug, Clone, Deserialize)]
pub struct QualityCheckRequest {
    /// Base64 JPEG of the produce
    pub image: String,
    /// What the image shows, e.g. "tomatoes"
    pub product_type: String,
}

/// Advisory quality assessment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// 1 to 10, 0 when unavailable
    #[serde(default)]
    pub quality_score: f64,
    #[serde(default, deserialize_with = "text_or_json")]
    pub freshness: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// False when this is a fallback rather than a model answer
    #[serde(default)]
    pub available: bool,
}

/// Input for negotiation help
#[derive(Debug, Clone, Deserialize)]
pub struct NegotiationRequest {
    /// Order being negotiated, if any
    #[serde(default)]
    pub order_id: Option<i64>,
    /// Price asked by the supplier
    pub current_price: f64,
    /// Price the vendor hopes for
    pub target_price: f64,
    /// Free-text situation
    #[serde(default)]
    pub context: String,
}

/// Advisory negotiation phrasing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NegotiationAdvice {
    /// Suggested phrasing in Hindi and English
    #[serde(default, deserialize_with = "text_or_json")]
    pub suggestion: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// False when this is a fallback rather than a model answer
    #[serde(default)]
    pub available: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrJson {
    Text(String),
    Json(Value),
}

fn text_or_json<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match Option::<TextOrJson>::deserialize(deserializer)? {
            Some(TextOrJson::Text(text)) => Some(text),
            Some(TextOrJson::Json(Value::Null)) | None => None,
            Some(TextOrJson::Json(value)) => Some(value.to_string()),
        },
    )
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(one)) if one.trim().is_empty() => Vec::new(),
        Some(OneOrMany::One(one)) => vec![one],
        Some(OneOrMany::Many(many)) => many,
        None => Vec::new(),
    })
}

/// Outcome of one provider round trip
enum Reply<T> {
    Parsed(T),
    /// The provider answered, but not with the expected JSON
    Unparsed(String),
    Failed,
}

/// Strips a Markdown code fence some models wrap JSON in.
fn extract_json(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn fallback_message(raw: String, default: &str) -> Option<String> {
    let raw = raw.trim();
    Some(if raw.is_empty() { default } else { raw }.to_string())
}

/// One prompt line describing a stored candidate.
fn candidate_line(candidate: &ProductWithSupplier) -> String {
    let distance = candidate
        .distance_km
        .map(|km| format!(", {km} km away"))
        .unwrap_or_default();
    format!(
        "\n- {}: {} at {:.2}/{}, rating {:.1}{distance}",
        candidate.supplier.business_name,
        candidate.product.name,
        candidate.product.price_per_unit,
        candidate.product.unit,
        candidate.supplier_user.rating
    )
}

/// Front door to the configured provider, with graceful degradation
#[derive(Clone)]
pub struct Advisor {
    provider: Option<Arc<dyn RecommendationProvider>>,
    timeout: Duration,
}

impl std::fmt::Debug for Advisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Advisor")
            .field("provider", &self.provider_name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Advisor {
    #[must_use]
    pub fn new(provider: Option<Arc<dyn RecommendationProvider>>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// An advisor that always returns fallbacks.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(None, Duration::from_secs(0))
    }

    /// Name of the configured provider, if any.
    #[must_use]
    pub fn provider_name(&self) -> Option<&'static str> {
        self.provider.as_ref().map(|p| p.name())
    }

    fn supports_images(&self) -> bool {
        self.provider.as_ref().is_some_and(|p| p.supports_images())
    }

    async fn ask<T: DeserializeOwned>(&self, prompt: Prompt) -> Reply<T> {
        let Some(provider) = &self.provider else {
            debug!("No recommendation provider configured");
            return Reply::Failed;
        };

        let reply = match tokio::time::timeout(self.timeout, provider.complete(&prompt)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => {
                warn!(provider = provider.name(), error = %err, "Provider call failed");
                return Reply::Failed;
            }
            Err(_) => {
                warn!(provider = provider.name(), timeout = ?self.timeout, "Provider call timed out");
                return Reply::Failed;
            }
        };

        match serde_json::from_str(extract_json(&reply)) {
            Ok(parsed) => Reply::Parsed(parsed),
            Err(err) => {
                warn!(provider = provider.name(), error = %err, "Provider reply was not the expected JSON");
                Reply::Unparsed(reply)
            }
        }
    }

    /// Recommends suppliers for a category near the vendor.
    ///
    /// `nearby` are the stored candidates (available products of online
    /// suppliers) the model should choose from.
    ///
    /// # Errors
    /// Returns a validation error for a blank category or invalid coordinates.
    /// Provider problems yield a fallback instead.
    pub async fn recommend(
        &self,
        request: &RecommendationRequest,
        nearby: &[ProductWithSupplier],
    ) -> Result<Recommendations> {
        let category = request.category.trim();
        if category.is_empty() {
            return Err(Error::validation("category", "cannot be empty"));
        }
        let location = GeoPoint::new(request.latitude, request.longitude)?;
        debug!(vendor_id = ?request.vendor_id, category, candidates = nearby.len(), "Recommending suppliers");

        let mut user = format!(
            "Find suppliers for category: {category}, location: {},{}, urgency: {}. \
             Consider factors like proximity, reliability, price, and delivery speed. \
             Provide response in JSON format with recommendations array containing \
             supplier names, ratings, and distances.",
            location.latitude,
            location.longitude,
            request.urgency.as_str()
        );
        if !nearby.is_empty() {
            user.push_str("\n\nOnline suppliers near the vendor:");
            for candidate in nearby {
                user.push_str(&candidate_line(candidate));
            }
        }

        let prompt = Prompt {
            system: Some(
                "You are an AI assistant for Indian street food vendors. Provide smart \
                 supplier recommendations based on location, category, and urgency. Always \
                 respond in JSON format with recommendations array."
                    .to_string(),
            ),
            user,
            image_base64: None,
        };

        Ok(match self.ask::<Recommendations>(prompt).await {
            Reply::Parsed(parsed) => Recommendations {
                available: true,
                ..parsed
            },
            Reply::Unparsed(raw) => Recommendations {
                message: fallback_message(raw, RECOMMENDATIONS_UNAVAILABLE),
                ..Default::default()
            },
            Reply::Failed => Recommendations {
                message: Some(RECOMMENDATIONS_UNAVAILABLE.to_string()),
                ..Default::default()
            },
        })
    }

    /// Scores the quality of produce from a photo.
    ///
    /// Providers that cannot see images are asked for general guidance on the
    /// product type instead.
    ///
    /// # Errors
    /// Returns a validation error for a blank image or product type.
    pub async fn quality_check(&self, request: &QualityCheckRequest) -> Result<QualityReport> {
        let product_type = request.product_type.trim();
        if product_type.is_empty() {
            return Err(Error::validation("product_type", "cannot be empty"));
        }
        if request.image.trim().is_empty() {
            return Err(Error::validation("image", "cannot be empty"));
        }

        let mut user = format!(
            "Analyze the quality of this {product_type}. Provide a quality score (1-10), \
             freshness assessment, and any concerns. Respond in JSON format with \
             quality_score, freshness, and concerns fields."
        );
        let image_base64 = if self.supports_images() {
            Some(request.image.clone())
        } else {
            user.push_str(&format!(
                " Note: Image analysis not available, provide general quality guidelines for {product_type}."
            ));
            None
        };

        let prompt = Prompt {
            system: Some(
                "You are a food quality expert. Analyze images of raw materials for Indian \
                 street food and provide quality scores (1-10) and recommendations. Respond \
                 in JSON format."
                    .to_string(),
            ),
            user,
            image_base64,
        };

        Ok(match self.ask::<QualityReport>(prompt).await {
            Reply::Parsed(parsed) => QualityReport {
                quality_score: parsed.quality_score.clamp(0.0, 10.0),
                available: true,
                ..parsed
            },
            Reply::Unparsed(raw) => QualityReport {
                message: fallback_message(raw, QUALITY_UNAVAILABLE),
                ..Default::default()
            },
            Reply::Failed => QualityReport {
                message: Some(QUALITY_UNAVAILABLE.to_string()),
                ..Default::default()
            },
        })
    }

    /// Suggests polite phrasing for negotiating a price down.
    ///
    /// # Errors
    /// Returns a validation error when a price is not a positive number.
    pub async fn negotiate(&self, request: &NegotiationRequest) -> Result<NegotiationAdvice> {
        for (field, price) in [
            ("current_price", request.current_price),
            ("target_price", request.target_price),
        ] {
            if !price.is_finite() || price <= 0.0 {
                return Err(Error::validation(field, "must be a positive number"));
            }
        }
        debug!(order_id = ?request.order_id, "Drafting negotiation advice");

        let prompt = Prompt {
            system: Some(
                "You are a negotiation expert for Indian street food vendors. Provide polite, \
                 culturally appropriate negotiation suggestions in Hindi and English. Respond \
                 in JSON format."
                    .to_string(),
            ),
            user: format!(
                "Help negotiate price from ₹{} to ₹{}. Context: {}. Provide respectful \
                 negotiation phrases in both Hindi and English. Respond in JSON format with \
                 suggestion field containing the negotiation advice.",
                request.current_price,
                request.target_price,
                request.context.trim()
            ),
            image_base64: None,
        };

        Ok(match self.ask::<NegotiationAdvice>(prompt).await {
            Reply::Parsed(parsed) => NegotiationAdvice {
                available: true,
                ..parsed
            },
            Reply::Unparsed(raw) => NegotiationAdvice {
                message: fallback_message(raw, NEGOTIATION_UNAVAILABLE),
                ..Default::default()
            },
            Reply::Failed => NegotiationAdvice {
                message: Some(NEGOTIATION_UNAVAILABLE.to_string()),
                ..Default::default()
            },
        })
    }
}

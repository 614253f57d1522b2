//! Situation records and the SIRI service-status document parser.
//!
//! Only the path the service uses is modeled:
//! `Siri/ServiceDelivery/SituationExchangeDelivery/Situations/PtSituationElement`.
//! Everything else in the document is ignored.

use serde::Deserialize;
use transit_core::{Error, Result};

/// One service situation from the feed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Situation {
    /// Classification such as `"Delays"` or `"Planned Work"`.
    #[serde(rename = "ReasonName", default)]
    pub reason_name: String,
    /// Free text; names the affected line as a bracketed code like `[A]`.
    #[serde(rename = "LongDescription", default)]
    pub long_description: String,
}

impl Situation {
    pub fn new(reason_name: impl Into<String>, long_description: impl Into<String>) -> Self {
        Self {
            reason_name: reason_name.into(),
            long_description: long_description.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Siri {
    #[serde(rename = "ServiceDelivery")]
    service_delivery: ServiceDelivery,
}

#[derive(Debug, Deserialize)]
struct ServiceDelivery {
    #[serde(rename = "SituationExchangeDelivery", default)]
    situation_exchange_delivery: Option<SituationExchangeDelivery>,
}

#[derive(Debug, Deserialize)]
struct SituationExchangeDelivery {
    #[serde(rename = "Situations", default)]
    situations: Option<Situations>,
}

#[derive(Debug, Deserialize)]
struct Situations {
    #[serde(rename = "PtSituationElement", default)]
    elements: Vec<Situation>,
}

/// Parse a service-status document into its situations.
///
/// A document with no `Situations` element yields an empty list.
///
/// # Errors
///
/// Returns `Error::FeedParseFailed` if the document is not well-formed or
/// lacks `ServiceDelivery`.
pub fn parse_service_status(xml: &str) -> Result<Vec<Situation>> {
    let siri: Siri = quick_xml::de::from_str(xml)
        .map_err(|e| Error::feed_parse_failed(format!("invalid SIRI document: {e}")))?;

    Ok(siri
        .service_delivery
        .situation_exchange_delivery
        .and_then(|delivery| delivery.situations)
        .map(|situations| situations.elements)
        .unwrap_or_default())
}

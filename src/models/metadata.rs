//! Off-chain metadata document referenced by the on-chain `uri`
//!
//! Field order and shape follow the fungible-token metadata standard that
//! wallets and explorers read, so the serialized form must stay stable.

use super::form::{SocialLinks, TokenForm};
use crate::constants::storage::METADATA_IMAGE_TYPE;
use serde::{Deserialize, Serialize};

/// File entry under `properties.files`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFile {
    pub uri: String,
    #[serde(rename = "type")]
    pub file_type: String,
}

/// `properties` object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataProperties {
    pub files: Vec<MetadataFile>,
}

/// Metadata document published to the object store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDocument {
    pub name: String,
    pub symbol: String,
    pub description: String,
    /// Image URL, empty when no image was uploaded
    pub image: String,
    /// Always empty
    pub attributes: Vec<serde_json::Value>,
    pub properties: MetadataProperties,
    pub links: SocialLinks,
}

impl MetadataDocument {
    /// Snapshot the form and the uploaded image URL
    pub fn from_form(form: &TokenForm, image_url: Option<&str>) -> Self {
        let files = image_url
            .map(|uri| {
                vec![MetadataFile {
                    uri: uri.to_string(),
                    file_type: METADATA_IMAGE_TYPE.to_string(),
                }]
            })
            .unwrap_or_default();

        Self {
            name: form.name.clone(),
            symbol: form.symbol.clone(),
            description: form.description.clone(),
            image: image_url.unwrap_or_default().to_string(),
            attributes: Vec::new(),
            properties: MetadataProperties { files },
            links: form.links.clone(),
        }
    }

    /// Compact JSON as stored in the object store
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

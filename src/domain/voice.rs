//! 音色目录条目
//!
//! 字段名保持合成服务目录的 PascalCase 格式，原样透传给调用方

use serde::{Deserialize, Serialize};

/// 合成服务提供的音色
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Voice {
    pub name: String,
    pub short_name: String,
    pub gender: String,
    pub locale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_codec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Voice {
    pub fn new(
        short_name: impl Into<String>,
        gender: impl Into<String>,
        locale: impl Into<String>,
    ) -> Self {
        let short_name = short_name.into();
        Self {
            name: short_name.clone(),
            short_name,
            gender: gender.into(),
            locale: locale.into(),
            suggested_codec: None,
            friendly_name: None,
            status: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_entry_format() {
        let json = r#"{
            "Name": "Microsoft Server Speech Text to Speech Voice (zh-HK, HiuMaanNeural)",
            "ShortName": "zh-HK-HiuMaanNeural",
            "Gender": "Female",
            "Locale": "zh-HK",
            "SuggestedCodec": "audio-24khz-48kbitrate-mono-mp3",
            "Status": "GA"
        }"#;
        let voice: Voice = serde_json::from_str(json).unwrap();
        assert_eq!(voice.short_name, "zh-HK-HiuMaanNeural");
        assert_eq!(voice.friendly_name, None);

        let back = serde_json::to_value(&voice).unwrap();
        assert_eq!(back["ShortName"], "zh-HK-HiuMaanNeural");
        assert!(back.get("FriendlyName").is_none());
    }
}

use crate::config::types::{Codec, CodecSpec, CodecTable};
use anyhow::{Result, anyhow, bail};

/// 縮放後允許的最小高度
pub const MIN_MAX_HEIGHT: u32 = 16;

impl CodecTable {
    pub fn spec(&self, codec: Codec) -> Result<&CodecSpec> {
        self.entries
            .get(&codec)
            .ok_or_else(|| anyhow!("No encoder settings for codec '{codec}'"))
    }
}

/// 一次批次編碼所使用的參數
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeProfile {
    pub codec: Codec,
    pub crf: u8,
    pub preset: String,
    pub max_height: Option<u32>,
}

impl EncodeProfile {
    /// 以參數表的預設值補齊未指定的欄位，並檢查範圍
    pub fn resolve(
        table: &CodecTable,
        codec: Codec,
        crf: Option<u8>,
        preset: Option<&str>,
        max_height: Option<u32>,
    ) -> Result<Self> {
        let spec = table.spec(codec)?;

        let crf = crf.unwrap_or(spec.default_crf);
        if crf > spec.max_crf {
            bail!(
                "CRF {crf} is out of range for {codec} (expected 0-{})",
                spec.max_crf
            );
        }

        let preset = preset
            .map_or_else(|| spec.default_preset.clone(), |p| p.trim().to_lowercase());
        if !spec.accepts_preset(&preset) {
            bail!(
                "Unknown preset '{preset}' for {codec} (expected one of: {})",
                spec.presets.join(", ")
            );
        }

        if let Some(height) = max_height {
            if height < MIN_MAX_HEIGHT || height % 2 != 0 {
                bail!("Downscale height must be an even number of at least {MIN_MAX_HEIGHT}, got {height}");
            }
        }

        Ok(Self {
            codec,
            crf,
            preset,
            max_height,
        })
    }
}

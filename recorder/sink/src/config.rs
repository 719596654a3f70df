/*!
    Container writer configuration.
*/

use recorder_encode::EncoderSettings;

/// Major brand written into MP4 and MOV headers.
pub const DEFAULT_BRAND: &str = "mp42";

/**
    Configuration for a [`ContainerWriter`](crate::ContainerWriter).
*/
#[derive(Clone, Debug)]
pub struct WriterConfig {
    /// Settings for the frame encoder the writer opens.
    pub encoder: EncoderSettings,
    /// Major brand for MP4-family containers. `None` leaves the muxer default.
    pub brand: Option<String>,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            encoder: EncoderSettings::default(),
            brand: Some(DEFAULT_BRAND.to_string()),
        }
    }
}

impl WriterConfig {
    pub fn with_encoder_settings(mut self, settings: EncoderSettings) -> Self {
        self.encoder = settings;
        self
    }

    pub fn with_brand(mut self, brand: Option<String>) -> Self {
        self.brand = brand;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_brand() {
        assert_eq!(WriterConfig::default().brand.as_deref(), Some("mp42"));
        assert_eq!(WriterConfig::default().with_brand(None).brand, None);
    }
}

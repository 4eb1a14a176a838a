use super::layer::LayerSpec;
use serde::{de::Visitor, Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub type Frame = i32;

/// Inclusive range of frames a layer renders, written as `"<start>-<end>"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRange {
    pub start: Frame,
    pub end: Frame,
}

impl FrameRange {
    pub fn new(start: Frame, end: Frame) -> Self {
        Self { start, end }
    }

    pub fn single(frame: Frame) -> Self {
        Self::new(frame, frame)
    }

    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }

    /// Number of frames covered, zero when the range is inverted.
    pub fn len(&self) -> u64 {
        if self.is_ordered() {
            (self.end as i64 - self.start as i64 + 1) as u64
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for FrameRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid frame range `{0}`, expected <start>-<end>")]
pub struct FrameRangeParseError(String);

impl FromStr for FrameRange {
    type Err = FrameRangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = || FrameRangeParseError(s.to_owned());

        // skip the first char so a negative start frame is not taken as the separator
        let split = trimmed
            .char_indices()
            .skip(1)
            .find(|(_, c)| *c == '-')
            .map(|(i, _)| i);

        match split {
            Some(i) => {
                let start = trimmed[..i].trim().parse().map_err(|_| err())?;
                let end = trimmed[i + 1..].trim().parse().map_err(|_| err())?;
                Ok(FrameRange::new(start, end))
            }
            None => trimmed.parse().map(FrameRange::single).map_err(|_| err()),
        }
    }
}

impl Serialize for FrameRange {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FrameRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct FrameRangeVisitor;

        impl Visitor<'_> for FrameRangeVisitor {
            type Value = FrameRange;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a frame range such as \"1001-1010\"")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(FrameRangeVisitor)
    }
}

/// One submission: accounting context plus the layers to render.
///
/// This is also the value handed across the process boundary, so it owns all
/// of its data and carries no reference to the caller's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequest {
    pub name: String,
    pub show: String,
    pub shot: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    pub layers: Vec<LayerSpec>,
}

impl JobRequest {
    pub fn new(
        name: impl Into<String>,
        show: impl Into<String>,
        shot: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            show: show.into(),
            shot: shot.into(),
            username: username.into(),
            priority: None,
            layers: Vec::new(),
        }
    }

    pub fn with_layer(mut self, layer: LayerSpec) -> Self {
        self.layers.push(layer);
        self
    }
}

//! Obfuscation profile -- the tuning fields of the AWG transport overlay.
//!
//! Every field is optional; absent means "use transport default". A profile
//! with nothing meaningful set is treated as "no profile" by the sync layer
//! (see [`ObfuscationProfile::has_non_default_values`]).

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A magic-header slot: either a single fixed 64-bit value or a closed
/// `[min, max]` range. The field counts as set only when both bounds are
/// present.
///
/// Wire forms accepted: a bare integer (`5`), a two-element array
/// (`[5, 9]`), or a bounds object (`{"min": 5}`). Serialisation emits the
/// most compact form that round-trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MagicHeader {
    pub min: Option<u64>,
    pub max: Option<u64>,
}

impl MagicHeader {
    pub fn fixed(value: u64) -> Self {
        Self {
            min: Some(value),
            max: Some(value),
        }
    }

    pub fn range(min: u64, max: u64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// True iff both bounds are present and at least one is non-zero.
    pub fn has_value(&self) -> bool {
        matches!((self.min, self.max), (Some(a), Some(b)) if a != 0 || b != 0)
    }

    /// True iff both bounds are present and equal.
    pub fn is_fixed(&self) -> bool {
        matches!((self.min, self.max), (Some(a), Some(b)) if a == b)
    }

    /// The single value when the header is fixed, else `None`.
    pub fn fixed_value(&self) -> Option<u64> {
        match (self.min, self.max) {
            (Some(a), Some(b)) if a == b => Some(a),
            _ => None,
        }
    }

    /// True when neither bound is present (the field was absent on the wire).
    pub fn is_unset(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

impl Serialize for MagicHeader {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match (self.min, self.max) {
            (Some(a), Some(b)) if a == b => serializer.serialize_u64(a),
            (Some(a), Some(b)) => (a, b).serialize(serializer),
            (min, max) => {
                #[derive(Serialize)]
                struct Bounds {
                    #[serde(skip_serializing_if = "Option::is_none")]
                    min: Option<u64>,
                    #[serde(skip_serializing_if = "Option::is_none")]
                    max: Option<u64>,
                }
                Bounds { min, max }.serialize(serializer)
            }
        }
    }
}

impl<'de> Deserialize<'de> for MagicHeader {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Fixed(u64),
            Pair(u64, u64),
            Bounds {
                #[serde(default)]
                min: Option<u64>,
                #[serde(default)]
                max: Option<u64>,
            },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Fixed(v) => Ok(MagicHeader::fixed(v)),
            Repr::Pair(min, max) if min <= max => Ok(MagicHeader::range(min, max)),
            Repr::Pair(min, max) => Err(D::Error::custom(format!(
                "magic header range is inverted: [{min}, {max}]"
            ))),
            Repr::Bounds { min, max } => Ok(MagicHeader { min, max }),
        }
    }
}

/// The full obfuscation profile a peer (or the local node) carries.
///
/// Field names on the wire are the daemon's short codes: junk packet
/// controls (`JC`/`JMin`/`JMax`), per-packet junk sizes (`S1`-`S4`),
/// static content slots (`I1`-`I5`), magic headers (`H1`-`H4`). The schema
/// evolves additively; unknown fields are ignored on decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObfuscationProfile {
    #[serde(rename = "JC", default, skip_serializing_if = "Option::is_none")]
    pub junk_packet_count: Option<u32>,
    #[serde(rename = "JMin", default, skip_serializing_if = "Option::is_none")]
    pub junk_min_size: Option<u32>,
    #[serde(rename = "JMax", default, skip_serializing_if = "Option::is_none")]
    pub junk_max_size: Option<u32>,
    #[serde(rename = "S1", default, skip_serializing_if = "Option::is_none")]
    pub init_junk_size: Option<u32>,
    #[serde(rename = "S2", default, skip_serializing_if = "Option::is_none")]
    pub response_junk_size: Option<u32>,
    #[serde(rename = "S3", default, skip_serializing_if = "Option::is_none")]
    pub cookie_junk_size: Option<u32>,
    #[serde(rename = "S4", default, skip_serializing_if = "Option::is_none")]
    pub transport_junk_size: Option<u32>,
    #[serde(rename = "I1", default, skip_serializing_if = "Option::is_none")]
    pub init_static_content: Option<String>,
    #[serde(rename = "I2", default, skip_serializing_if = "Option::is_none")]
    pub response_static_content: Option<String>,
    #[serde(rename = "I3", default, skip_serializing_if = "Option::is_none")]
    pub reserved_content_3: Option<String>,
    #[serde(rename = "I4", default, skip_serializing_if = "Option::is_none")]
    pub reserved_content_4: Option<String>,
    #[serde(rename = "I5", default, skip_serializing_if = "Option::is_none")]
    pub reserved_content_5: Option<String>,
    #[serde(rename = "H1", default, skip_serializing_if = "MagicHeader::is_unset")]
    pub magic_header_1: MagicHeader,
    #[serde(rename = "H2", default, skip_serializing_if = "MagicHeader::is_unset")]
    pub magic_header_2: MagicHeader,
    #[serde(rename = "H3", default, skip_serializing_if = "MagicHeader::is_unset")]
    pub magic_header_3: MagicHeader,
    #[serde(rename = "H4", default, skip_serializing_if = "MagicHeader::is_unset")]
    pub magic_header_4: MagicHeader,
}

impl ObfuscationProfile {
    /// The four magic-header slots in wire order.
    pub fn magic_headers(&self) -> [&MagicHeader; 4] {
        [
            &self.magic_header_1,
            &self.magic_header_2,
            &self.magic_header_3,
            &self.magic_header_4,
        ]
    }

    /// Whether any field carries a meaningful value.
    ///
    /// A profile of all-absent or all-zero/empty fields is equivalent to
    /// "no profile": integers count when present and non-zero, strings when
    /// present and non-empty, magic headers when [`MagicHeader::has_value`].
    pub fn has_non_default_values(&self) -> bool {
        let ints = [
            self.junk_packet_count,
            self.junk_min_size,
            self.junk_max_size,
            self.init_junk_size,
            self.response_junk_size,
            self.cookie_junk_size,
            self.transport_junk_size,
        ];
        let strings = [
            &self.init_static_content,
            &self.response_static_content,
            &self.reserved_content_3,
            &self.reserved_content_4,
            &self.reserved_content_5,
        ];

        ints.iter().flatten().any(|v| *v != 0)
            || strings
                .iter()
                .any(|s| s.as_deref().is_some_and(|s| !s.is_empty()))
            || self.magic_headers().iter().any(|h| h.has_value())
    }
}

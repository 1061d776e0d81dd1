//! Configuration types deserialized from `tessera.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// The top-level run configuration parsed from `tessera.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Design metadata.
    pub design: DesignMeta,
    /// Locations of every input file.
    pub inputs: InputPaths,
    /// Output format and destination.
    #[serde(default)]
    pub output: OutputConfig,
    /// Engine knobs.
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Design metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct DesignMeta {
    /// The design name, used for default output file names.
    pub name: String,
    /// A brief description of the design.
    #[serde(default)]
    pub description: String,
}

/// Paths to the inputs of one build, relative to the configuration file.
///
/// Any path ending in `.gz` is decompressed on the fly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputPaths {
    /// Logical architecture description.
    #[serde(default)]
    pub arch: String,
    /// Physical/circuit architecture description.
    #[serde(default)]
    pub circuit: String,
    /// Routing-resource graph (`.pyx`, `.json` or `.bin`).
    #[serde(default)]
    pub rrg: String,
    /// Packed-design tree.
    #[serde(default)]
    pub packed: String,
    /// Placement table.
    #[serde(default)]
    pub place: String,
    /// Routing result.
    #[serde(default)]
    pub route: String,
    /// Post-synthesis structural source holding LUT truth tables.
    pub synth: Option<String>,
    /// Declarative logical-to-physical annotation file.
    pub annotations: Option<String>,
    /// Repack (clock) pin constraints.
    pub repack: Option<String>,
    /// Coordinate map from bit path to bit-line/word-line address.
    pub coord_map: Option<String>,
    /// Prior bitstream to compare against.
    pub prior: Option<String>,
    /// Bitstreams merged last, in order.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub overrides: Vec<String>,
    /// Where to read or write a bincode snapshot of the parsed routing graph.
    pub rrg_cache: Option<String>,
}

/// Output configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Serialization format.
    #[serde(default)]
    pub format: OutputFormat,
    /// Output file. Defaults to `<design.name>.<ext>` next to the config.
    pub path: Option<String>,
    /// Annotate XML bits with bit-line/word-line addresses.
    #[serde(default)]
    pub xml_addresses: bool,
}

/// Serialization format of the produced bitstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `value,path` lines.
    #[default]
    Csv,
    /// `<bitstream>` document of `<bit>` elements.
    Xml,
    /// One line per word line with a one-hot row address.
    Rows,
}

impl OutputFormat {
    /// Returns the conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Xml => "xml",
            OutputFormat::Rows => "txt",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(OutputFormat::Csv),
            "xml" => Ok(OutputFormat::Xml),
            "rows" => Ok(OutputFormat::Rows),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

/// Engine knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Default value of every select bit of a clock-selecting mux.
    #[serde(default = "default_clock_mux")]
    pub clock_mux_default: char,
}

fn default_clock_mux() -> char {
    '0'
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            clock_mux_default: default_clock_mux(),
        }
    }
}

/// Deserializes a field that can be either a single string or a list of strings.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

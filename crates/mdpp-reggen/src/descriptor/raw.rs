//! Descriptor document shape as written in Hjson.
//!
//! These types mirror the file format loosely: every optional key has a
//! default and unknown keys are ignored. Register list entries stay as JSON
//! values here because their kind is decided by which key they carry.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// Integer-or-text value. Hjson writes numbers both bare and quoted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub(crate) enum Scalar {
    Int(u64),
    Bool(bool),
    Text(String),
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawBlock {
    pub name: String,
    #[serde(default)]
    pub one_line_desc: Option<String>,
    #[serde(default)]
    pub clocking: Vec<RawClock>,
    #[serde(default)]
    pub bus_interfaces: Vec<RawBusInterface>,
    #[serde(default)]
    pub regwidth: Option<Scalar>,
    #[serde(default)]
    pub param_list: Vec<RawParam>,
    #[serde(default)]
    pub interrupt_list: Vec<RawSignal>,
    #[serde(default)]
    pub alert_list: Vec<RawSignal>,
    #[serde(default)]
    pub countermeasures: Vec<RawCountermeasure>,
    #[serde(default)]
    pub available_input_list: Vec<RawSignal>,
    #[serde(default)]
    pub available_output_list: Vec<RawSignal>,
    #[serde(default)]
    pub available_inout_list: Vec<RawSignal>,
    #[serde(default)]
    pub registers: RawRegisters,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawClock {
    #[serde(default)]
    pub clock: Option<String>,
    #[serde(default)]
    pub reset: Option<String>,
    #[serde(default)]
    pub primary: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawBusInterface {
    pub protocol: String,
    pub direction: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawParam {
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub default: Option<Scalar>,
    /// Local parameters cannot be overridden.
    #[serde(default)]
    pub local: Option<Scalar>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSignal {
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub width: Option<Scalar>,
    #[serde(default, rename = "type")]
    pub ty: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawCountermeasure {
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
}

/// Register entries: a single list, or lists keyed by bus interface name.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawRegisters {
    List(Vec<Value>),
    ByInterface(BTreeMap<String, Vec<Value>>),
}

impl Default for RawRegisters {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

/// A plain register, or the template of a multireg.
#[derive(Debug, Deserialize)]
pub(crate) struct RawRegister {
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub swaccess: Option<String>,
    #[serde(default)]
    pub fields: Vec<RawField>,
    /// Multireg only: number of instances.
    #[serde(default)]
    pub count: Option<Scalar>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawField {
    pub bits: Scalar,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub resval: Option<Scalar>,
    #[serde(default)]
    pub swaccess: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawWindow {
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    pub items: Scalar,
    #[serde(default)]
    pub swaccess: Option<String>,
    #[serde(default)]
    pub validbits: Option<Scalar>,
}

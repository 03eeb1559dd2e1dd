//! Register descriptor model.
//!
//! [`IpBlock::from_text`] parses an Hjson descriptor in two steps: the text is
//! read into a generic JSON tree (syntax errors), then mapped onto the
//! descriptor shape and checked for consistency (shape and semantic errors).
//!
//! # Register layout
//!
//! Register entries are laid out from offset 0 in declaration order, one
//! register width apart:
//! - `{skipto: 0x100}` moves the next offset forward (never backward)
//! - `{reserved: n}` leaves `n` register slots unused
//! - `{window: {...}}` reserves `items` slots, aligned to the next power of two
//! - `{multireg: {..., count: n}}` expands into registers `NAME_0 .. NAME_<n-1>`
//!
//! `count`, `items`, `width` and `regwidth` accept integers or parameter names.
//! Parameter values come from the caller's overrides first, then from the
//! `default` of the parameter declaration. Local parameters ignore overrides.

mod access;
mod raw;

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde_json::Value;

pub use access::{BitRange, SwAccess, parse_int};
use raw::{
    RawBlock, RawBusInterface, RawClock, RawField, RawRegister, RawRegisters, RawSignal,
    RawWindow, Scalar,
};

use crate::error::DescriptorError;

/// Default register width in bits.
const DEFAULT_REGWIDTH: u64 = 32;

/// Size of a register block's address space in bytes.
const ADDRESS_SPACE: u64 = 1 << 32;

/// Most entries one register block may hold after multireg expansion.
const MAX_ENTRIES: usize = 1 << 16;

/// Clock assumed when a descriptor declares none.
const DEFAULT_CLOCK: &str = "clk_i";

/// Reset paired with [`DEFAULT_CLOCK`].
const DEFAULT_RESET: &str = "rst_ni";

/// A parsed hardware block descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpBlock {
    pub name: String,
    pub one_line_desc: Option<String>,
    pub clocks: Vec<Clock>,
    pub bus_interfaces: Vec<BusInterface>,
    /// Register width in bits.
    pub regwidth: u32,
    pub params: Vec<Param>,
    pub interrupts: Vec<Signal>,
    pub alerts: Vec<Signal>,
    pub countermeasures: Vec<Countermeasure>,
    pub inputs: Vec<Signal>,
    pub outputs: Vec<Signal>,
    pub inouts: Vec<Signal>,
    /// Register blocks, one per bus interface that has registers.
    pub register_blocks: Vec<RegisterBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clock {
    pub name: String,
    pub reset: Option<String>,
    pub primary: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusDirection {
    Device,
    Host,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusInterface {
    pub protocol: String,
    pub direction: BusDirection,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub desc: Option<String>,
    /// Effective value after overrides.
    pub value: Option<String>,
    pub local: bool,
}

/// A named signal: pin, interrupt or alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub name: String,
    pub desc: Option<String>,
    pub width: u32,
    /// Interrupt type (`event`, `status`), when declared.
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countermeasure {
    pub name: String,
    pub desc: Option<String>,
}

/// Registers reachable through one bus interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterBlock {
    /// Interface name; `None` for the default interface.
    pub interface: Option<String>,
    pub entries: Vec<RegEntry>,
}

impl RegisterBlock {
    /// Iterate over the plain registers of the block.
    pub fn registers(&self) -> impl Iterator<Item = &Register> {
        self.entries.iter().filter_map(|entry| match entry {
            RegEntry::Register(register) => Some(register),
            RegEntry::Window(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegEntry {
    Register(Register),
    Window(Window),
}

impl RegEntry {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Register(register) => &register.name,
            Self::Window(window) => &window.name,
        }
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        match self {
            Self::Register(register) => register.offset,
            Self::Window(window) => window.offset,
        }
    }

    #[must_use]
    pub fn desc(&self) -> Option<&str> {
        match self {
            Self::Register(register) => register.desc.as_deref(),
            Self::Window(window) => window.desc.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    pub name: String,
    pub desc: Option<String>,
    /// Byte offset from the start of the register block.
    pub offset: u64,
    pub swaccess: SwAccess,
    /// Fields in declaration order.
    pub fields: Vec<Field>,
}

impl Register {
    /// Register value after reset, with unknown fields read as zero.
    #[must_use]
    pub fn reset_value(&self) -> u64 {
        self.fields
            .iter()
            .filter_map(|field| field.resval.map(|v| v << field.bits.lsb))
            .fold(0, |acc, v| acc | v)
    }

    /// Bits whose reset value is known.
    #[must_use]
    pub fn reset_mask(&self) -> u64 {
        self.fields
            .iter()
            .filter(|field| field.resval.is_some())
            .fold(0, |acc, field| acc | field.bits.mask())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub desc: Option<String>,
    pub bits: BitRange,
    pub swaccess: SwAccess,
    /// Reset value; `None` when declared unknown (`x`).
    pub resval: Option<u64>,
}

/// A memory window inside the register space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub name: String,
    pub desc: Option<String>,
    pub offset: u64,
    /// Number of register-width items.
    pub items: u64,
    pub swaccess: SwAccess,
    /// Number of meaningful bits per item.
    pub validbits: u32,
}

impl IpBlock {
    /// Parse a descriptor.
    ///
    /// `params` overrides parameter defaults by name; overrides for
    /// parameters the descriptor does not declare are ignored. `origin`
    /// labels every error.
    pub fn from_text(
        text: &str,
        params: &[(String, String)],
        origin: &str,
    ) -> Result<Self, DescriptorError> {
        let tree: Value =
            deser_hjson::from_str(text).map_err(|source| DescriptorError::Syntax {
                origin: origin.to_owned(),
                source,
            })?;
        let builder = Builder {
            origin,
            params: Vec::new(),
            regwidth: 0,
        };
        let raw: RawBlock = builder.shape(tree, "descriptor")?;
        builder.build(raw, params)
    }

    /// Register width in bytes.
    #[must_use]
    pub fn regbytes(&self) -> u64 {
        u64::from(self.regwidth / 8)
    }

    /// The primary clock.
    #[must_use]
    pub fn primary_clock(&self) -> Option<&Clock> {
        self.clocks.iter().find(|clock| clock.primary)
    }
}

/// Validation state shared while building one block.
struct Builder<'o> {
    origin: &'o str,
    params: Vec<Param>,
    regwidth: u32,
}

impl Builder<'_> {
    fn invalid(&self, message: impl Into<String>) -> DescriptorError {
        DescriptorError::Invalid {
            origin: self.origin.to_owned(),
            message: message.into(),
        }
    }

    fn check_unique(&self, names: &mut HashSet<String>, name: &str) -> Result<(), DescriptorError> {
        if names.insert(name.to_owned()) {
            Ok(())
        } else {
            Err(self.invalid(format!("duplicate register name '{name}'")))
        }
    }

    fn shape<T: DeserializeOwned>(
        &self,
        value: Value,
        context: &str,
    ) -> Result<T, DescriptorError> {
        serde_json::from_value(value).map_err(|source| DescriptorError::Shape {
            origin: self.origin.to_owned(),
            context: context.to_owned(),
            source,
        })
    }

    fn build(
        mut self,
        raw: RawBlock,
        overrides: &[(String, String)],
    ) -> Result<IpBlock, DescriptorError> {
        if raw.name.is_empty() {
            return Err(self.invalid("block name cannot be empty"));
        }

        self.params = raw
            .param_list
            .into_iter()
            .map(|param| {
                let local = matches!(param.local, Some(Scalar::Bool(true)))
                    || matches!(&param.local, Some(Scalar::Text(s)) if s == "true");
                let overridden = overrides
                    .iter()
                    .find(|(name, _)| !local && *name == param.name)
                    .map(|(_, value)| value.clone());
                Param {
                    value: overridden.or_else(|| param.default.as_ref().map(scalar_text)),
                    name: param.name,
                    desc: param.desc,
                    local,
                }
            })
            .collect();

        let regwidth = match &raw.regwidth {
            Some(scalar) => self.resolve(scalar, "regwidth")?,
            None => DEFAULT_REGWIDTH,
        };
        self.regwidth = match regwidth {
            8 | 16 | 32 | 64 => u32::try_from(regwidth).unwrap_or(32),
            other => {
                return Err(self.invalid(format!(
                    "regwidth must be 8, 16, 32 or 64, got {other}"
                )));
            }
        };

        let clocks = build_clocks(raw.clocking);
        let bus_interfaces = raw
            .bus_interfaces
            .into_iter()
            .map(|bus| self.build_bus_interface(bus))
            .collect::<Result<Vec<_>, _>>()?;

        let interrupts = self.build_signals(raw.interrupt_list, "interrupt")?;
        let alerts = self.build_signals(raw.alert_list, "alert")?;
        let inputs = self.build_signals(raw.available_input_list, "input")?;
        let outputs = self.build_signals(raw.available_output_list, "output")?;
        let inouts = self.build_signals(raw.available_inout_list, "inout")?;
        let countermeasures = raw
            .countermeasures
            .into_iter()
            .map(|cm| Countermeasure {
                name: cm.name,
                desc: cm.desc,
            })
            .collect();

        let register_blocks = match raw.registers {
            RawRegisters::List(entries) if entries.is_empty() => Vec::new(),
            RawRegisters::List(entries) => vec![self.build_register_block(None, entries)?],
            RawRegisters::ByInterface(by_interface) => {
                let mut blocks = by_interface
                    .into_iter()
                    .map(|(interface, entries)| self.build_register_block(Some(interface), entries))
                    .collect::<Result<Vec<_>, _>>()?;
                // Declaration order of the bus interfaces; undeclared names last.
                blocks.sort_by_key(|registers| {
                    bus_interfaces
                        .iter()
                        .position(|bus| bus.name == registers.interface)
                        .unwrap_or(usize::MAX)
                });
                blocks
            }
        };

        Ok(IpBlock {
            name: raw.name,
            one_line_desc: raw.one_line_desc,
            clocks,
            bus_interfaces,
            regwidth: self.regwidth,
            params: self.params,
            interrupts,
            alerts,
            countermeasures,
            inputs,
            outputs,
            inouts,
            register_blocks,
        })
    }

    /// Resolve an integer that may be written as a parameter name.
    fn resolve(&self, scalar: &Scalar, what: &str) -> Result<u64, DescriptorError> {
        match scalar {
            Scalar::Int(value) => Ok(*value),
            Scalar::Bool(_) => Err(self.invalid(format!("{what} must be an integer"))),
            Scalar::Text(text) => {
                if let Some(value) = parse_int(text) {
                    return Ok(value);
                }
                let param = self
                    .params
                    .iter()
                    .find(|param| param.name == *text)
                    .ok_or_else(|| {
                        self.invalid(format!("{what} refers to unknown parameter '{text}'"))
                    })?;
                param.value.as_deref().and_then(parse_int).ok_or_else(|| {
                    self.invalid(format!(
                        "{what} refers to parameter '{text}' without an integer value"
                    ))
                })
            }
        }
    }

    fn resolve_u32(&self, scalar: &Scalar, what: &str) -> Result<u32, DescriptorError> {
        let value = self.resolve(scalar, what)?;
        u32::try_from(value).map_err(|_| self.invalid(format!("{what} is out of range: {value}")))
    }

    fn access(
        &self,
        value: Option<&str>,
        inherited: SwAccess,
        what: &str,
    ) -> Result<SwAccess, DescriptorError> {
        match value {
            None => Ok(inherited),
            Some(text) => SwAccess::parse(text)
                .ok_or_else(|| self.invalid(format!("{what} has unknown swaccess '{text}'"))),
        }
    }

    fn build_bus_interface(&self, bus: RawBusInterface) -> Result<BusInterface, DescriptorError> {
        let direction = match bus.direction.as_str() {
            "device" => BusDirection::Device,
            "host" => BusDirection::Host,
            other => {
                return Err(self.invalid(format!(
                    "bus interface direction must be 'device' or 'host', got '{other}'"
                )));
            }
        };
        Ok(BusInterface {
            protocol: bus.protocol,
            direction,
            name: bus.name,
        })
    }

    fn build_signals(
        &self,
        raw: Vec<RawSignal>,
        kind: &str,
    ) -> Result<Vec<Signal>, DescriptorError> {
        let mut seen = HashSet::new();
        raw.into_iter()
            .map(|signal| {
                if !seen.insert(signal.name.clone()) {
                    return Err(self.invalid(format!("duplicate {kind} '{}'", signal.name)));
                }
                let width = match &signal.width {
                    Some(width) => {
                        self.resolve_u32(width, &format!("width of {kind} '{}'", signal.name))?
                    }
                    None => 1,
                };
                if width == 0 {
                    return Err(self.invalid(format!("{kind} '{}' has zero width", signal.name)));
                }
                Ok(Signal {
                    name: signal.name,
                    desc: signal.desc,
                    width,
                    kind: signal.ty,
                })
            })
            .collect()
    }

    fn build_register_block(
        &self,
        interface: Option<String>,
        entries: Vec<Value>,
    ) -> Result<RegisterBlock, DescriptorError> {
        let regbytes = u64::from(self.regwidth / 8);
        let mut offset = 0u64;
        let mut names = HashSet::new();
        let mut built = Vec::new();

        for (index, entry) in entries.into_iter().enumerate() {
            let Value::Object(mut map) = entry else {
                return Err(self.invalid(format!("register entry {index} is not an object")));
            };

            if let Some(target) = map.remove("skipto") {
                let scalar: Scalar = self.shape(target, "skipto")?;
                let target = self.resolve(&scalar, "skipto")?;
                if target >= ADDRESS_SPACE {
                    return Err(self.invalid(format!(
                        "skipto {target:#x} is outside the 32-bit address space"
                    )));
                }
                if target < offset {
                    return Err(self.invalid(format!(
                        "skipto {target:#x} is below the current offset {offset:#x}"
                    )));
                }
                if target % regbytes != 0 {
                    return Err(self.invalid(format!(
                        "skipto {target:#x} is not aligned to {regbytes} bytes"
                    )));
                }
                offset = target;
            } else if let Some(count) = map.remove("reserved") {
                let scalar: Scalar = self.shape(count, "reserved")?;
                let count = self.resolve(&scalar, "reserved")?;
                offset = self.advance(offset, count, "reserved space")?;
            } else if let Some(window) = map.remove("window") {
                let raw: RawWindow = self.shape(window, &format!("window entry {index}"))?;
                let window = self.build_window(raw, &mut offset)?;
                self.check_unique(&mut names, &window.name)?;
                built.push(RegEntry::Window(window));
            } else if let Some(multireg) = map.remove("multireg") {
                let raw: RawRegister = self.shape(multireg, &format!("multireg entry {index}"))?;
                let room = MAX_ENTRIES - built.len();
                for register in self.expand_multireg(raw, &mut offset, room)? {
                    self.check_unique(&mut names, &register.name)?;
                    built.push(RegEntry::Register(register));
                }
            } else {
                let raw: RawRegister =
                    self.shape(Value::Object(map), &format!("register entry {index}"))?;
                let register = self.build_register(raw, offset)?;
                offset = self.advance(offset, 1, &format!("register '{}'", register.name))?;
                self.check_unique(&mut names, &register.name)?;
                built.push(RegEntry::Register(register));
            }

            if built.len() > MAX_ENTRIES {
                return Err(self.invalid(format!(
                    "register block has more than {MAX_ENTRIES} entries"
                )));
            }
        }

        Ok(RegisterBlock {
            interface,
            entries: built,
        })
    }

    /// Offset after `count` register slots starting at `offset`.
    fn advance(&self, offset: u64, count: u64, what: &str) -> Result<u64, DescriptorError> {
        count
            .checked_mul(u64::from(self.regwidth / 8))
            .and_then(|size| offset.checked_add(size))
            .filter(|end| *end <= ADDRESS_SPACE)
            .ok_or_else(|| self.invalid(format!("{what} does not fit in the 32-bit address space")))
    }

    fn build_window(&self, raw: RawWindow, offset: &mut u64) -> Result<Window, DescriptorError> {
        let what = format!("window '{}'", raw.name);
        let items = self.resolve(&raw.items, &format!("items of {what}"))?;
        if items == 0 {
            return Err(self.invalid(format!("{what} has no items")));
        }
        let validbits = match &raw.validbits {
            Some(bits) => self.resolve_u32(bits, &format!("validbits of {what}"))?,
            None => self.regwidth,
        };
        if validbits == 0 || validbits > self.regwidth {
            return Err(self.invalid(format!(
                "validbits of {what} must be between 1 and {}",
                self.regwidth
            )));
        }

        let out_of_space =
            || self.invalid(format!("{what} does not fit in the 32-bit address space"));
        let size = items
            .checked_mul(u64::from(self.regwidth / 8))
            .filter(|size| *size <= ADDRESS_SPACE)
            .ok_or_else(out_of_space)?;
        let start = size
            .checked_next_power_of_two()
            .and_then(|align| offset.checked_next_multiple_of(align))
            .ok_or_else(out_of_space)?;
        *offset = start
            .checked_add(size)
            .filter(|end| *end <= ADDRESS_SPACE)
            .ok_or_else(out_of_space)?;

        Ok(Window {
            swaccess: self.access(raw.swaccess.as_deref(), SwAccess::Rw, &what)?,
            name: raw.name,
            desc: raw.desc,
            offset: start,
            items,
            validbits,
        })
    }

    fn expand_multireg(
        &self,
        raw: RawRegister,
        offset: &mut u64,
        room: usize,
    ) -> Result<Vec<Register>, DescriptorError> {
        let count_scalar = raw
            .count
            .clone()
            .ok_or_else(|| self.invalid(format!("multireg '{}' has no count", raw.name)))?;
        let count = self.resolve(&count_scalar, &format!("count of multireg '{}'", raw.name))?;
        if count == 0 {
            return Err(self.invalid(format!("multireg '{}' has zero count", raw.name)));
        }
        if usize::try_from(count).ok().is_none_or(|count| count > room) {
            return Err(self.invalid(format!(
                "multireg '{}' count {count} exceeds the {MAX_ENTRIES} entries of a register block",
                raw.name
            )));
        }

        let template = self.build_register(raw, 0)?;
        let start = *offset;
        *offset = self.advance(start, count, &format!("multireg '{}'", template.name))?;

        let regbytes = u64::from(self.regwidth / 8);
        Ok((0..count)
            .map(|index| Register {
                name: format!("{}_{index}", template.name),
                offset: start + index * regbytes,
                ..template.clone()
            })
            .collect())
    }

    fn build_register(&self, raw: RawRegister, offset: u64) -> Result<Register, DescriptorError> {
        if raw.name.is_empty() {
            return Err(self.invalid("register name cannot be empty"));
        }
        let what = format!("register '{}'", raw.name);
        if raw.fields.is_empty() {
            return Err(self.invalid(format!("{what} has no fields")));
        }

        let swaccess = self.access(raw.swaccess.as_deref(), SwAccess::Rw, &what)?;
        let single = raw.fields.len() == 1;
        let mut used = 0u64;
        let mut field_names = HashSet::new();
        let mut fields = Vec::with_capacity(raw.fields.len());

        for field in raw.fields {
            let built = self.build_field(field, &raw.name, single, swaccess)?;
            if used & built.bits.mask() != 0 {
                return Err(self.invalid(format!(
                    "field '{}' of {what} overlaps another field",
                    built.name
                )));
            }
            used |= built.bits.mask();
            if !field_names.insert(built.name.clone()) {
                return Err(self.invalid(format!("duplicate field '{}' in {what}", built.name)));
            }
            fields.push(built);
        }

        Ok(Register {
            name: raw.name,
            desc: raw.desc,
            offset,
            swaccess,
            fields,
        })
    }

    fn build_field(
        &self,
        raw: RawField,
        register: &str,
        single: bool,
        inherited: SwAccess,
    ) -> Result<Field, DescriptorError> {
        let bits = match &raw.bits {
            Scalar::Int(bit) => u32::try_from(*bit).ok().map(|bit| BitRange { msb: bit, lsb: bit }),
            Scalar::Text(text) => BitRange::parse(text),
            Scalar::Bool(_) => None,
        }
        .ok_or_else(|| {
            self.invalid(format!(
                "field of register '{register}' has invalid bits {:?}",
                raw.bits
            ))
        })?;

        let name = match raw.name {
            Some(name) if !name.is_empty() => name,
            _ if single => register.to_owned(),
            _ => {
                return Err(self.invalid(format!(
                    "field at bits {bits} of register '{register}' needs a name"
                )));
            }
        };
        let what = format!("field '{name}' of register '{register}'");
        if bits.msb >= self.regwidth {
            return Err(self.invalid(format!(
                "{what} exceeds the {}-bit register width",
                self.regwidth
            )));
        }

        let resval = match &raw.resval {
            None => Some(0),
            Some(Scalar::Text(text)) if text.eq_ignore_ascii_case("x") => None,
            Some(Scalar::Bool(flag)) => Some(u64::from(*flag)),
            Some(Scalar::Int(value)) => Some(*value),
            Some(Scalar::Text(text)) => Some(
                parse_int(text)
                    .ok_or_else(|| self.invalid(format!("{what} has invalid resval '{text}'")))?,
            ),
        };
        if let Some(value) = resval
            && value > bits.mask() >> bits.lsb
        {
            return Err(self.invalid(format!(
                "resval {value:#x} of {what} does not fit in {} bits",
                bits.width()
            )));
        }

        Ok(Field {
            swaccess: self.access(raw.swaccess.as_deref(), inherited, &what)?,
            name,
            desc: raw.desc,
            bits,
            resval,
        })
    }
}

fn scalar_text(scalar: &Scalar) -> String {
    match scalar {
        Scalar::Int(value) => value.to_string(),
        Scalar::Bool(flag) => flag.to_string(),
        Scalar::Text(text) => text.clone(),
    }
}

fn build_clocks(raw: Vec<RawClock>) -> Vec<Clock> {
    if raw.is_empty() {
        return vec![Clock {
            name: DEFAULT_CLOCK.to_owned(),
            reset: Some(DEFAULT_RESET.to_owned()),
            primary: true,
        }];
    }

    let explicit_primary = raw.iter().any(|clock| clock.primary == Some(true));
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, clock)| {
            let primary = if explicit_primary {
                clock.primary == Some(true)
            } else {
                index == 0
            };
            clock.clock.map(|name| Clock {
                name,
                reset: clock.reset,
                primary,
            })
        })
        .collect()
}

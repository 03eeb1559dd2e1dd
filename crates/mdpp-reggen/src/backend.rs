//! Descriptor parsing and rendering behind one seam.

use std::fmt;

use crate::descriptor::IpBlock;
use crate::error::DescriptorError;
use crate::html;

/// Parser and renderers for one descriptor format.
///
/// The generator only sequences these calls; it never inspects the parsed
/// block itself.
pub trait RegisterBackend {
    /// Parsed descriptor.
    type Block;
    /// Parse failure.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Parse descriptor `text`.
    ///
    /// `params` overrides parameter defaults; `origin` labels errors.
    fn parse(
        &self,
        text: &str,
        params: &[(String, String)],
        origin: &str,
    ) -> Result<Self::Block, Self::Error>;

    /// Append the hardware interface summary.
    fn render_interfaces(&self, block: &Self::Block, out: &mut String) -> fmt::Result;

    /// Append the register tables.
    fn render_registers(&self, block: &Self::Block, out: &mut String) -> fmt::Result;
}

/// Hjson descriptors rendered to HTML.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeBackend;

impl RegisterBackend for NativeBackend {
    type Block = IpBlock;
    type Error = DescriptorError;

    fn parse(
        &self,
        text: &str,
        params: &[(String, String)],
        origin: &str,
    ) -> Result<IpBlock, DescriptorError> {
        IpBlock::from_text(text, params, origin)
    }

    fn render_interfaces(&self, block: &IpBlock, out: &mut String) -> fmt::Result {
        html::render_interfaces(block, out)
    }

    fn render_registers(&self, block: &IpBlock, out: &mut String) -> fmt::Result {
        html::render_registers(block, out)
    }
}

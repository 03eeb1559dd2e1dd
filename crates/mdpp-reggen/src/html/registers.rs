//! Register tables.

use std::fmt::{self, Write};

use super::{escape_html, render_markdown, summary_line};
use crate::descriptor::{Field, IpBlock, RegEntry, Register, RegisterBlock, Window};

/// Append the register documentation of `block`: a summary table per
/// register block followed by one table per register or window.
pub fn render_registers(block: &IpBlock, out: &mut String) -> fmt::Result {
    if block.register_blocks.is_empty() {
        return writeln!(out, "<p>This block has no software-visible registers.</p>");
    }

    for registers in &block.register_blocks {
        let prefix = match &registers.interface {
            Some(interface) => {
                writeln!(
                    out,
                    "<p>Registers visible under device interface <code>{}</code>:</p>",
                    escape_html(interface)
                )?;
                format!("{}.{interface}", block.name)
            }
            None => block.name.clone(),
        };
        write_summary(out, block, registers, &prefix)?;
        for entry in &registers.entries {
            match entry {
                RegEntry::Register(register) => write_register(out, block, register, &prefix)?,
                RegEntry::Window(window) => write_window(out, block, window, &prefix)?,
            }
        }
    }
    Ok(())
}

fn anchor(prefix: &str, name: &str) -> String {
    format!("{prefix}-{name}").replace('.', "-").to_lowercase()
}

fn write_summary(
    out: &mut String,
    block: &IpBlock,
    registers: &RegisterBlock,
    prefix: &str,
) -> fmt::Result {
    writeln!(out, r#"<table class="regdef-summary">"#)?;
    writeln!(
        out,
        "<thead><tr><th>Name</th><th>Offset</th><th>Length</th><th>Description</th></tr></thead>"
    )?;
    writeln!(out, "<tbody>")?;
    for entry in &registers.entries {
        let length = match entry {
            RegEntry::Register(_) => block.regbytes(),
            RegEntry::Window(window) => window.items * block.regbytes(),
        };
        writeln!(
            out,
            r##"<tr><td><a href="#{}">{}.{}</a></td><td>{:#x}</td><td>{length}</td><td>{}</td></tr>"##,
            anchor(prefix, entry.name()),
            escape_html(prefix),
            escape_html(entry.name()),
            entry.offset(),
            summary_line(entry.desc()),
        )?;
    }
    writeln!(out, "</tbody>\n</table>")
}

fn write_register(
    out: &mut String,
    block: &IpBlock,
    register: &Register,
    prefix: &str,
) -> fmt::Result {
    let digits = (block.regwidth / 4) as usize;
    writeln!(
        out,
        r#"<table class="regdef" id="{}">"#,
        anchor(prefix, &register.name)
    )?;
    writeln!(
        out,
        r#"<tr><th colspan="5"><code>{}.{}</code> @ {:#x}</th></tr>"#,
        escape_html(prefix),
        escape_html(&register.name),
        register.offset
    )?;
    if let Some(desc) = &register.desc {
        write!(out, r#"<tr><td colspan="5">"#)?;
        render_markdown(desc, out);
        writeln!(out, "</td></tr>")?;
    }
    writeln!(
        out,
        r#"<tr><td colspan="5">Reset default = <code>{:#0width$x}</code>, mask <code>{:#0width$x}</code></td></tr>"#,
        register.reset_value(),
        register.reset_mask(),
        width = digits + 2
    )?;
    writeln!(
        out,
        "<tr><th>Bits</th><th>Type</th><th>Reset</th><th>Name</th><th>Description</th></tr>"
    )?;

    let mut fields: Vec<&Field> = register.fields.iter().collect();
    fields.sort_by(|a, b| b.bits.msb.cmp(&a.bits.msb));
    for field in fields {
        let reset = field
            .resval
            .map_or_else(|| "x".to_owned(), |value| format!("{value:#x}"));
        write!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{reset}</td><td>{}</td><td>",
            field.bits,
            field.swaccess,
            escape_html(&field.name)
        )?;
        if let Some(desc) = &field.desc {
            render_markdown(desc, out);
        }
        writeln!(out, "</td></tr>")?;
    }
    writeln!(out, "</table>")
}

fn write_window(out: &mut String, block: &IpBlock, window: &Window, prefix: &str) -> fmt::Result {
    writeln!(
        out,
        r#"<table class="regdef" id="{}">"#,
        anchor(prefix, &window.name)
    )?;
    writeln!(
        out,
        r#"<tr><th><code>{}.{}</code> @ {:#x} + {:#x}</th></tr>"#,
        escape_html(prefix),
        escape_html(&window.name),
        window.offset,
        window.items * block.regbytes()
    )?;
    writeln!(
        out,
        "<tr><td>{} item {} window, {} valid bits per {}-bit item</td></tr>",
        window.items, window.swaccess, window.validbits, block.regwidth
    )?;
    if let Some(desc) = &window.desc {
        write!(out, "<tr><td>")?;
        render_markdown(desc, out);
        writeln!(out, "</td></tr>")?;
    }
    writeln!(out, "</table>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(text: &str) -> String {
        let block = IpBlock::from_text(text, &[], "test").unwrap();
        let mut out = String::new();
        render_registers(&block, &mut out).unwrap();
        out
    }

    #[test]
    fn test_no_registers() {
        assert_eq!(
            render(r#"{name: "bare"}"#),
            "<p>This block has no software-visible registers.</p>\n"
        );
    }

    #[test]
    fn test_register_table() {
        let html = render(
            r#"{
              name: "uart",
              registers: [
                { name: "CTRL",
                  desc: "Control register",
                  fields: [
                    {bits: "0", name: "TX", desc: "Enable *transmit*", resval: "1"},
                    {bits: "7:4", name: "MODE", resval: "x", swaccess: "ro"},
                  ]
                },
              ]
            }"#,
        );

        assert_eq!(
            html,
            concat!(
                "<table class=\"regdef-summary\">\n",
                "<thead><tr><th>Name</th><th>Offset</th><th>Length</th><th>Description</th></tr></thead>\n",
                "<tbody>\n",
                "<tr><td><a href=\"#uart-ctrl\">uart.CTRL</a></td><td>0x0</td><td>4</td><td>Control register</td></tr>\n",
                "</tbody>\n</table>\n",
                "<table class=\"regdef\" id=\"uart-ctrl\">\n",
                "<tr><th colspan=\"5\"><code>uart.CTRL</code> @ 0x0</th></tr>\n",
                "<tr><td colspan=\"5\"><p>Control register</p>\n</td></tr>\n",
                "<tr><td colspan=\"5\">Reset default = <code>0x00000001</code>, mask <code>0x00000001</code></td></tr>\n",
                "<tr><th>Bits</th><th>Type</th><th>Reset</th><th>Name</th><th>Description</th></tr>\n",
                "<tr><td>7:4</td><td>ro</td><td>x</td><td>MODE</td><td></td></tr>\n",
                "<tr><td>0</td><td>rw</td><td>0x1</td><td>TX</td><td><p>Enable <em>transmit</em></p>\n</td></tr>\n",
                "</table>\n",
            )
        );
    }

    #[test]
    fn test_window_table() {
        let html = render(
            r#"{
              name: "mem",
              registers: [
                {window: {name: "BUF", items: "4", swaccess: "wo", validbits: "8", desc: "Buffer"}},
              ]
            }"#,
        );

        assert!(html.contains("<td><a href=\"#mem-buf\">mem.BUF</a></td><td>0x0</td><td>16</td><td>Buffer</td>"));
        assert!(html.contains("<tr><th><code>mem.BUF</code> @ 0x0 + 0x10</th></tr>"));
        assert!(html.contains("<tr><td>4 item wo window, 8 valid bits per 32-bit item</td></tr>"));
    }

    #[test]
    fn test_interface_prefix() {
        let html = render(
            r#"{
              name: "dual",
              registers: {core: [{name: "A", fields: [{bits: "0"}]}]}
            }"#,
        );

        assert!(html.starts_with(
            "<p>Registers visible under device interface <code>core</code>:</p>\n"
        ));
        assert!(html.contains(r##"<a href="#dual-core-a">dual.core.A</a>"##));
        assert!(html.contains(r#"id="dual-core-a""#));
    }

    #[test]
    fn test_descriptions_escaped_and_headingless() {
        let html = render(
            r###"{
              name: "x",
              registers: [{name: "A", desc: "# Big <b>", fields: [{bits: "0", desc: "<h1>no</h1>"}]}]
            }"###,
        );

        assert!(!html.contains("<h"), "unexpected heading in {html}");
        assert!(!html.contains("<b>"));
    }
}

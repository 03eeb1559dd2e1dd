//! Hardware interface summary.

use std::fmt::{self, Write};

use super::{escape_html, render_markdown};
use crate::descriptor::{BusDirection, BusInterface, IpBlock, Signal};

const NONE: &str = "<i>none</i>";

/// Append the interface summary of `block`: clocks, bus interfaces,
/// peripheral pins, interrupts, alerts and countermeasures.
pub fn render_interfaces(block: &IpBlock, out: &mut String) -> fmt::Result {
    writeln!(out, r#"<div class="reggen-interfaces">"#)?;
    if let Some(desc) = &block.one_line_desc {
        writeln!(out, "<p>{}</p>", escape_html(desc))?;
    }

    writeln!(out, "<ul>")?;
    writeln!(
        out,
        "<li>IP name: <b><code>{}</code></b></li>",
        escape_html(&block.name)
    )?;

    let primary = block.primary_clock();
    writeln!(
        out,
        "<li>Primary Clock: {}</li>",
        code_list(primary.map(|clock| clock.name.as_str()))
    )?;
    let others = block
        .clocks
        .iter()
        .filter(|clock| !clock.primary)
        .map(|clock| clock.name.as_str());
    writeln!(out, "<li>Other Clocks: {}</li>", code_list(others))?;

    write_bus_interfaces(out, &block.bus_interfaces, BusDirection::Device)?;
    write_bus_interfaces(out, &block.bus_interfaces, BusDirection::Host)?;

    let pin_count = block.inputs.len() + block.outputs.len() + block.inouts.len();
    writeln!(
        out,
        "<li>Peripheral Pins for Chip IO: {}</li>",
        count_or_none(pin_count)
    )?;
    writeln!(
        out,
        "<li>Interrupts: {}</li>",
        count_or_none(block.interrupts.len())
    )?;
    writeln!(
        out,
        "<li>Security Alerts: {}</li>",
        count_or_none(block.alerts.len())
    )?;
    writeln!(
        out,
        "<li>Security Countermeasures: {}</li>",
        count_or_none(block.countermeasures.len())
    )?;
    writeln!(out, "</ul>")?;

    if pin_count > 0 {
        writeln!(out, r#"<table class="reggen-pins">"#)?;
        writeln!(out, "<caption>Peripheral Pins for Chip IO</caption>")?;
        writeln!(
            out,
            "<thead><tr><th>Pin name</th><th>Direction</th><th>Width</th><th>Description</th></tr></thead>"
        )?;
        writeln!(out, "<tbody>")?;
        for (direction, pins) in [
            ("input", &block.inputs),
            ("output", &block.outputs),
            ("inout", &block.inouts),
        ] {
            for pin in pins {
                write_signal_row(out, pin, direction)?;
            }
        }
        writeln!(out, "</tbody>\n</table>")?;
    }

    if !block.interrupts.is_empty() {
        write_signal_table(out, "Interrupts", "Interrupt name", &block.interrupts)?;
    }
    if !block.alerts.is_empty() {
        write_signal_table(out, "Security Alerts", "Alert name", &block.alerts)?;
    }

    if !block.countermeasures.is_empty() {
        writeln!(out, r#"<table class="reggen-countermeasures">"#)?;
        writeln!(out, "<caption>Security Countermeasures</caption>")?;
        writeln!(
            out,
            "<thead><tr><th>Countermeasure ID</th><th>Description</th></tr></thead>"
        )?;
        writeln!(out, "<tbody>")?;
        for cm in &block.countermeasures {
            write!(
                out,
                "<tr><td><code>{}.{}</code></td><td>",
                escape_html(&block.name.to_uppercase()),
                escape_html(&cm.name)
            )?;
            if let Some(desc) = &cm.desc {
                render_markdown(desc, out);
            }
            writeln!(out, "</td></tr>")?;
        }
        writeln!(out, "</tbody>\n</table>")?;
    }

    writeln!(out, "</div>")
}

fn write_bus_interfaces(
    out: &mut String,
    interfaces: &[BusInterface],
    direction: BusDirection,
) -> fmt::Result {
    let label = match direction {
        BusDirection::Device => "Bus Device Interfaces",
        BusDirection::Host => "Bus Host Interfaces",
    };
    let matching: Vec<&BusInterface> = interfaces
        .iter()
        .filter(|bus| bus.direction == direction)
        .collect();
    if matching.is_empty() {
        return writeln!(out, "<li>{label}: {NONE}</li>");
    }

    write!(out, "<li>{label}: ")?;
    for (index, bus) in matching.iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        let name = bus.name.as_deref().unwrap_or("default");
        write!(
            out,
            "<b><code>{}</code></b> ({})",
            escape_html(name),
            protocol_label(&bus.protocol)
        )?;
    }
    writeln!(out, "</li>")
}

fn write_signal_table(
    out: &mut String,
    caption: &str,
    column: &str,
    signals: &[Signal],
) -> fmt::Result {
    writeln!(out, r#"<table class="reggen-signals">"#)?;
    writeln!(out, "<caption>{caption}</caption>")?;
    writeln!(
        out,
        "<thead><tr><th>{column}</th><th>Type</th><th>Width</th><th>Description</th></tr></thead>"
    )?;
    writeln!(out, "<tbody>")?;
    for signal in signals {
        write_signal_row(out, signal, signal.kind.as_deref().unwrap_or("event"))?;
    }
    writeln!(out, "</tbody>\n</table>")
}

fn write_signal_row(out: &mut String, signal: &Signal, kind: &str) -> fmt::Result {
    write!(
        out,
        "<tr><td><code>{}</code></td><td>{}</td><td>{}</td><td>",
        escape_html(&signal.name),
        escape_html(kind),
        signal.width
    )?;
    if let Some(desc) = &signal.desc {
        render_markdown(desc, out);
    }
    writeln!(out, "</td></tr>")
}

fn protocol_label(protocol: &str) -> String {
    match protocol {
        "tlul" => "TL-UL".to_owned(),
        other => escape_html(other),
    }
}

fn count_or_none(count: usize) -> String {
    if count == 0 {
        NONE.to_owned()
    } else {
        count.to_string()
    }
}

fn code_list<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let items: Vec<String> = names
        .into_iter()
        .map(|name| format!("<b><code>{}</code></b>", escape_html(name)))
        .collect();
    if items.is_empty() {
        NONE.to_owned()
    } else {
        items.join(", ")
    }
}

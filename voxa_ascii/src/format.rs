use std::fmt::Write;

use voxa::{Value, scalar_codec};

/// Formats a Value as human-readable ASCII text.
pub fn to_ascii(value: &Value) -> String {
    let mut output = String::new();
    format_value(&mut output, value, 0);
    output
}

/// Formats a value with the given indentation level.
fn format_value(output: &mut String, value: &Value, indent: usize) {
    let indent_str = "  ".repeat(indent);

    match value {
        Value::Boolean(b) => output.push_str(if *b { "true" } else { "false" }),
        Value::Int(n) => {
            write!(output, "{n}isize").unwrap();
        }
        Value::Int8(n) => {
            write!(output, "{n}i8").unwrap();
        }
        Value::Int16(n) => {
            write!(output, "{n}i16").unwrap();
        }
        Value::Int32(n) => {
            write!(output, "{n}i32").unwrap();
        }
        Value::Int64(n) => {
            write!(output, "{n}i64").unwrap();
        }
        Value::UInt(n) => {
            write!(output, "{n}usize").unwrap();
        }
        Value::UInt8(n) => {
            write!(output, "{n}u8").unwrap();
        }
        Value::UInt16(n) => {
            write!(output, "{n}u16").unwrap();
        }
        Value::UInt32(n) => {
            write!(output, "{n}u32").unwrap();
        }
        Value::UInt64(n) => {
            write!(output, "{n}u64").unwrap();
        }
        Value::Float32(n) => {
            write!(output, "{n}f32").unwrap();
        }
        Value::Float64(n) => {
            write!(output, "{n}f64").unwrap();
        }
        Value::Bytes(bytes) => {
            output.push_str("bytes(");
            for b in bytes {
                write!(output, "{b:02x}").unwrap();
            }
            output.push(')');
        }
        Value::Text(_) => format_textual(output, value),
        Value::Time(_) => {
            output.push_str("time(");
            format_textual(output, value);
            output.push(')');
        }

        Value::List(items) => {
            output.push_str("list {");
            if items.is_empty() {
                output.push('}');
            } else {
                output.push('\n');
                for item in items {
                    output.push_str(&indent_str);
                    output.push_str("  ");
                    format_value(output, item, indent + 1);
                    output.push_str(",\n");
                }
                output.push_str(&indent_str);
                output.push('}');
            }
        }

        Value::Record(fields) => {
            output.push_str("record {");
            if fields.is_empty() {
                output.push('}');
            } else {
                output.push('\n');
                for (field_id, field_value) in fields {
                    output.push_str(&indent_str);
                    write!(output, "  {field_id}: ").unwrap();
                    format_value(output, field_value, indent + 1);
                    output.push_str(",\n");
                }
                output.push_str(&indent_str);
                output.push('}');
            }
        }
    }
}

/// Writes the scalar codec's quoted textual form.
fn format_textual(output: &mut String, value: &Value) {
    let mut rendered = Vec::new();
    let written = scalar_codec(value.atom())
        .map(|codec| codec.text_encode(value, &mut rendered).is_ok())
        .unwrap_or(false);
    if written {
        output.push_str(&String::from_utf8_lossy(&rendered));
    } else {
        output.push('?');
    }
}

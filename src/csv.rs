//! Minimal RFC 4180 writer for report and export rows

/// Quote a field when it holds a delimiter, quote or line break
pub fn field(value: &str) -> String
{   if value.contains([',', '"', '\n', '\r'])
    {   format!("\"{}\"", value.replace('"', "\"\""))
    } else
    {   value.to_string()
    }
}

/// One CRLF-terminated record
pub fn record<S: AsRef<str>>(fields: &[S]) -> String
{   let mut line = fields.iter()
      .map(|f| field(f.as_ref()))
      .collect::<Vec<_>>()
      .join(",");
    line.push_str("\r\n");
    line
}

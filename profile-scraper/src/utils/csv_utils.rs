//! CSV 编解码
//!
//! - 单元格按 RFC 4180 转义 (逗号、引号、换行需要引号包裹)
//! - 列表字段写成方括号字面量: `['a', 'b']`,空列表为 `[]`
//! - 布尔写成 `True` / `False`

use std::mem::take;

/// 转义CSV字段
pub fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
    {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// 将一行单元格拼接为CSV行 (含行尾换行)
pub fn format_row(cells: &[String]) -> String {
    let mut line = cells
        .iter()
        .map(|cell| escape_csv_field(cell))
        .collect::<Vec<_>>()
        .join(",");
    line.push_str("\r\n");
    line
}

/// 解析CSV文本为行
///
/// 支持引号内的逗号与换行、双引号转义、CRLF
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if matches!(chars.peek(), Some('"')) {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(take(&mut field));
                if !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

/// 布尔写法
pub fn format_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

pub fn parse_bool(cell: &str) -> Option<bool> {
    match cell.trim() {
        "True" | "true" | "1" => Some(true),
        "False" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// 列表字面量: ['a', 'b']
pub fn format_list(items: &[String]) -> String {
    let mut out = String::from("[");
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        out.push_str(&quote_item(item));
    }
    out.push(']');
    out
}

/// 含单引号且不含双引号时改用双引号,避免转义
fn quote_item(item: &str) -> String {
    let quote = if item.contains('\'') && !item.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(item.len() + 2);
    out.push(quote);
    for ch in item.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// 解析列表字面量
pub fn parse_list(cell: &str) -> Result<Vec<String>, String> {
    let inner = cell
        .trim()
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| format!("不是列表字面量: {}", cell))?;

    let mut items = Vec::new();
    let mut chars = inner.chars().peekable();

    loop {
        while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
            chars.next();
        }
        let quote = match chars.next() {
            None => break,
            Some(q @ ('\'' | '"')) => q,
            Some(other) => return Err(format!("列表元素缺少引号: {}", other)),
        };

        let mut item = String::new();
        loop {
            match chars.next() {
                None => return Err("列表元素引号未闭合".to_string()),
                Some('\\') => match chars.next() {
                    Some('n') => item.push('\n'),
                    Some('r') => item.push('\r'),
                    Some('t') => item.push('\t'),
                    Some(c) => item.push(c),
                    None => return Err("列表元素转义不完整".to_string()),
                },
                Some(c) if c == quote => break,
                Some(c) => item.push(c),
            }
        }
        items.push(item);

        while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
            chars.next();
        }
        match chars.next() {
            None => break,
            Some(',') => continue,
            Some(other) => return Err(format!("列表分隔符无效: {}", other)),
        }
    }

    Ok(items)
}

/// 表头行
pub fn header_line(fields: &[&str]) -> String {
    let mut line = fields.join(",");
    line.push_str("\r\n");
    line
}

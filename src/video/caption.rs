const REFERENCE_WIDTH: u32 = 512;

// 粗略估计的字符宽度（相对字号）：西文取平均值，中日韩等全角字符按一个字宽计
const NARROW_GLYPH_RATIO: f64 = 0.55;
const WIDE_GLYPH_RATIO: f64 = 1.0;

pub fn caption_font_size(base_size: u32, image_width: u32) -> u32 {
    let scaled = f64::from(base_size) * f64::from(image_width) / f64::from(REFERENCE_WIDTH);
    (scaled.round() as u32).max(12)
}

/// 东亚宽字符 / 全角字符
fn is_wide(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1100..=0x115F
            | 0x2E80..=0x303E
            | 0x3041..=0x33FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xA000..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
            | 0x1F300..=0x1F64F
            | 0x1F900..=0x1F9FF
            | 0x20000..=0x3FFFD
    )
}

fn glyph_width(c: char, font_size: u32) -> f64 {
    let ratio = if is_wide(c) { WIDE_GLYPH_RATIO } else { NARROW_GLYPH_RATIO };
    f64::from(font_size) * ratio
}

/// 估算一行字幕渲染后的像素宽度
pub fn caption_line_width(line: &str, font_size: u32) -> f64 {
    line.chars().map(|c| glyph_width(c, font_size)).sum()
}

/// 把字幕按可用宽度折行；没有空格的长串（包括中文句子）按宽度强制截断
pub fn wrap_caption(text: &str, image_width: u32, width_ratio: f64, font_size: u32) -> Vec<String> {
    let available = f64::from(image_width) * width_ratio;
    let space = glyph_width(' ', font_size);

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0;

    for word in text.split_whitespace() {
        for (piece, width) in split_to_fit(word, available, font_size) {
            if !current.is_empty() && current_width + space + width > available {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }

            if !current.is_empty() {
                current.push(' ');
                current_width += space;
            }
            current.push_str(&piece);
            current_width += width;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

// 每段至少保留一个字符，避免字号大于可用宽度时死循环
fn split_to_fit(word: &str, available: f64, font_size: u32) -> Vec<(String, f64)> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut width = 0.0;

    for c in word.chars() {
        let w = glyph_width(c, font_size);
        if !piece.is_empty() && width + w > available {
            pieces.push((std::mem::take(&mut piece), width));
            width = 0.0;
        }
        piece.push(c);
        width += w;
    }

    if !piece.is_empty() {
        pieces.push((piece, width));
    }

    pieces
}

/// 转义 filtergraph 中的选项值：先按选项层转义，再按滤镜图层转义
pub fn escape_filter_value(value: &str) -> String {
    let option_level = escape_chars(value, &['\\', '\'', ':']);
    escape_chars(&option_level, &['\\', '\'', '[', ']', ',', ';'])
}

fn escape_chars(value: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

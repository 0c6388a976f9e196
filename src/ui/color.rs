/// Parses "#rgb", "#rgba", "#rrggbb" or "#rrggbbaa" (the '#' is optional).
/// Only for trusted literals: invalid input panics, at compile time when the
/// result is assigned to a const.
pub const fn rgba_hex(s: &str) -> [f32; 4] {
    let bytes = s.as_bytes();

    // Handle optional '#' by offsetting start index
    let (bytes, len) = if !bytes.is_empty() && bytes[0] == b'#' {
        let (_, rem) = bytes.split_at(1);
        (rem, s.len() - 1)
    } else {
        (bytes, s.len())
    };

    // Const-safe hex char to u8
    const fn val(b: u8) -> u8 {
        match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => 10 + (b - b'a'),
            b'A'..=b'F' => 10 + (b - b'A'),
            _ => panic!("invalid hex digit in color string"),
        }
    }

    // Combine two hex digits into a byte
    const fn byte2(h: u8, l: u8) -> u8 {
        (val(h) << 4) | val(l)
    }

    // Expand 4-bit color to 8-bit (e.g. F -> FF)
    const fn rep(n: u8) -> u8 {
        (val(n) << 4) | val(n)
    }

    let (r, g, b, a) = match len {
        3 => (rep(bytes[0]), rep(bytes[1]), rep(bytes[2]), 0xFF),
        4 => (rep(bytes[0]), rep(bytes[1]), rep(bytes[2]), rep(bytes[3])),
        6 => (
            byte2(bytes[0], bytes[1]),
            byte2(bytes[2], bytes[3]),
            byte2(bytes[4], bytes[5]),
            0xFF,
        ),
        8 => (
            byte2(bytes[0], bytes[1]),
            byte2(bytes[2], bytes[3]),
            byte2(bytes[4], bytes[5]),
            byte2(bytes[6], bytes[7]),
        ),
        _ => panic!("color hex string must be 3, 4, 6, or 8 digits"),
    };

    [
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        a as f32 / 255.0,
    ]
}

/* =========================== MENU PALETTE =========================== */

pub const BACKDROP_RGBA: [f32; 4] = rgba_hex("#060505");
pub const COVER_RGBA: [f32; 4] = rgba_hex("#000000");

/// Ash specks: warm off-white, alpha chosen per palette slot.
pub const ASH_RGB: [f32; 3] = [230.0 / 255.0, 228.0 / 255.0, 225.0 / 255.0];

pub const TITLE_RGBA: [f32; 4] = rgba_hex("#E8E2D6");
pub const MENU_ITEM_RGBA: [f32; 4] = rgba_hex("#9A948C");
pub const MENU_SELECTED_RGBA: [f32; 4] = rgba_hex("#F2EDE4");
pub const NOTICE_PANEL_RGBA: [f32; 4] = rgba_hex("#141212E6");

pub const CREDIT_NAME_RGBA: [f32; 4] = rgba_hex("#FFFFFF");
pub const CREDIT_ROLE_RGBA: [f32; 4] = rgba_hex("#D3D3D3");

#[inline(always)]
pub const fn with_alpha(c: [f32; 4], alpha: f32) -> [f32; 4] {
    [c[0], c[1], c[2], c[3] * alpha]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_and_long_hex_forms_agree() {
        assert_eq!(rgba_hex("#fff"), rgba_hex("FFFFFFFF"));
        assert_eq!(rgba_hex("#0000"), [0.0, 0.0, 0.0, 0.0]);
        let c = rgba_hex("#141212E6");
        assert!((c[3] - 230.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn with_alpha_scales_existing_alpha() {
        let c = with_alpha(rgba_hex("#FFFFFF80"), 0.5);
        assert!((c[3] - 128.0 / 255.0 * 0.5).abs() < 1e-6);
    }
}

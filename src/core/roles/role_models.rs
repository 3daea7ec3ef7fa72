// Role management models: preset colours, hex parsing and the role log entry.

use rand::Rng;

/// Preset colours offered by `/role create`. `Random` and `Custom` are
/// resolved at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleColour {
    Default,
    Random,
    Custom,
    Red,
    DarkRed,
    Blue,
    DarkBlue,
    Green,
    DarkGreen,
    Yellow,
    Orange,
    Pink,
    Purple,
    LightGrey,
    DarkGrey,
    Magenta,
    Gold,
    Teal,
    Fuchsia,
    OgBlurple,
    Blurple,
    Greyple,
}

impl RoleColour {
    /// The fixed RGB value of a preset, `None` for `Random` and `Custom`.
    pub fn preset(self) -> Option<u32> {
        let rgb = match self {
            RoleColour::Default => 0x000000,
            RoleColour::Red => 0xE74C3C,
            RoleColour::DarkRed => 0x992D22,
            RoleColour::Blue => 0x3498DB,
            RoleColour::DarkBlue => 0x206694,
            RoleColour::Green => 0x2ECC71,
            RoleColour::DarkGreen => 0x1F8B4C,
            RoleColour::Yellow => 0xFEE75C,
            RoleColour::Orange => 0xE67E22,
            RoleColour::Pink => 0xEB459F,
            RoleColour::Purple => 0x9B59B6,
            RoleColour::LightGrey => 0x979C9F,
            RoleColour::DarkGrey => 0x607D8B,
            RoleColour::Magenta => 0xE91E63,
            RoleColour::Gold => 0xF1C40F,
            RoleColour::Teal => 0x1ABC9C,
            RoleColour::Fuchsia => 0xEB459E,
            RoleColour::OgBlurple => 0x7289DA,
            RoleColour::Blurple => 0x5865F2,
            RoleColour::Greyple => 0x99AAB5,
            RoleColour::Random | RoleColour::Custom => return None,
        };
        Some(rgb)
    }

    pub fn needs_custom_input(self) -> bool {
        self == RoleColour::Custom
    }

    /// Resolve everything except `Custom` to a concrete colour.
    pub fn resolve(self) -> Option<u32> {
        match self {
            RoleColour::Random => Some(random_colour()),
            other => other.preset(),
        }
    }
}

/// A random, fully saturated colour.
pub fn random_colour() -> u32 {
    let mut rng = rand::thread_rng();
    let hue: f64 = rng.gen_range(0.0..1.0);
    hsv_to_rgb(hue, 1.0, 1.0)
}

fn hsv_to_rgb(h: f64, s: f64, v: f64) -> u32 {
    let i = (h * 6.0).floor();
    let f = h * 6.0 - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);
    let (r, g, b) = match i as u32 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    let channel = |c: f64| (c * 255.0).round() as u32;
    (channel(r) << 16) | (channel(g) << 8) | channel(b)
}

/// Parse `#rrggbb`, `0xrrggbb` or `rrggbb`.
pub fn parse_hex_colour(input: &str) -> Option<u32> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleAction {
    Created,
    Added,
    Removed,
    Deleted,
}

impl RoleAction {
    pub fn label(self) -> &'static str {
        match self {
            RoleAction::Created => "Role Created",
            RoleAction::Added => "Role Added",
            RoleAction::Removed => "Role Removed",
            RoleAction::Deleted => "Role Deleted",
        }
    }
}

/// A role change posted to the moderation log. Role logs carry no case number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleLogEntry {
    pub action: RoleAction,
    pub role_name: String,
    pub role_id: u64,
    pub colour: u32,
    /// (tag, id) of the member the role was given to or taken from.
    pub member: Option<(String, u64)>,
    pub moderator: (String, u64),
    pub reason: Option<String>,
}

impl RoleLogEntry {
    /// (name, value) pairs in display order.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        // Deleted roles can no longer be mentioned.
        let role_value = if self.action == RoleAction::Deleted {
            format!("**{}**", self.role_name)
        } else {
            format!("**{}** (<@&{}>)", self.role_name, self.role_id)
        };

        let mut fields = vec![("Role Name", role_value)];
        if let Some((tag, id)) = &self.member {
            fields.push(("Member", format!("**{}** (<@{}>)", tag, id)));
        }
        fields.push((
            "Moderator",
            format!("**{}** (<@{}>)", self.moderator.0, self.moderator.1),
        ));
        if let Some(reason) = &self.reason {
            fields.push(("Reason", reason.clone()));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_colour_accepts_common_forms() {
        assert_eq!(parse_hex_colour("#ff0000"), Some(0xFF0000));
        assert_eq!(parse_hex_colour("0x00FF00"), Some(0x00FF00));
        assert_eq!(parse_hex_colour(" 0000ff "), Some(0x0000FF));
    }

    #[test]
    fn test_parse_hex_colour_rejects_garbage() {
        assert_eq!(parse_hex_colour("#fff"), None);
        assert_eq!(parse_hex_colour("zzzzzz"), None);
        assert_eq!(parse_hex_colour(""), None);
        assert_eq!(parse_hex_colour("#+12345"), None);
    }

    #[test]
    fn test_presets() {
        assert_eq!(RoleColour::Blurple.preset(), Some(0x5865F2));
        assert_eq!(RoleColour::Default.resolve(), Some(0));
        assert_eq!(RoleColour::Custom.resolve(), None);
        assert!(RoleColour::Random.resolve().unwrap() <= 0xFFFFFF);
    }

    #[test]
    fn test_role_log_fields() {
        let entry = RoleLogEntry {
            action: RoleAction::Added,
            role_name: "Helper".into(),
            role_id: 9,
            colour: 0,
            member: Some(("bob".into(), 2)),
            moderator: ("alice".into(), 1),
            reason: None,
        };

        let names: Vec<&str> = entry.fields().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["Role Name", "Member", "Moderator"]);
        assert_eq!(entry.fields()[0].1, "**Helper** (<@&9>)");
    }
}

// SPDX-License-Identifier: GPL-2.0
//
// power_hal: hint codes and payloads

/// Raw platform hint codes.
pub const POWER_HINT_INTERACTION: u32 = 0x0000_0002;
pub const POWER_HINT_VIDEO_ENCODE: u32 = 0x0000_0003;
pub const POWER_HINT_LAUNCH: u32 = 0x0000_0008;
/// Vendor extension carrying a profile id.
pub const POWER_HINT_SET_PROFILE: u32 = 0x0000_0111;

pub const STATE_ON: &str = "state=1";
pub const STATE_OFF: &str = "state=0";
pub const STATE_HDR_ON: &str = "state=2";
pub const STATE_HDR_OFF: &str = "state=3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerHint {
    Interaction,
    VideoEncode,
    Launch,
    SetProfile,
    /// Anything this HAL does not act on.
    Other(u32),
}

impl PowerHint {
    pub fn code(self) -> u32 {
        match self {
            PowerHint::Interaction => POWER_HINT_INTERACTION,
            PowerHint::VideoEncode => POWER_HINT_VIDEO_ENCODE,
            PowerHint::Launch => POWER_HINT_LAUNCH,
            PowerHint::SetProfile => POWER_HINT_SET_PROFILE,
            PowerHint::Other(code) => code,
        }
    }
}

impl From<u32> for PowerHint {
    fn from(code: u32) -> Self {
        match code {
            POWER_HINT_INTERACTION => PowerHint::Interaction,
            POWER_HINT_VIDEO_ENCODE => PowerHint::VideoEncode,
            POWER_HINT_LAUNCH => PowerHint::Launch,
            POWER_HINT_SET_PROFILE => PowerHint::SetProfile,
            other => PowerHint::Other(other),
        }
    }
}

/// Payload that accompanies a hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HintData<'a> {
    #[default]
    None,
    Profile(i32),
    Token(&'a str),
}

impl<'a> HintData<'a> {
    pub fn profile(self) -> Option<i32> {
        match self {
            HintData::Profile(id) => Some(id),
            _ => None,
        }
    }

    pub fn token(self) -> Option<&'a str> {
        match self {
            HintData::Token(token) => Some(token),
            _ => None,
        }
    }
}

/// Video encoder state carried by a VIDEO_ENCODE hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeState {
    On,
    Off,
    HdrOn,
    HdrOff,
}

impl EncodeState {
    /// Tokens must match exactly.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            STATE_ON => Some(EncodeState::On),
            STATE_OFF => Some(EncodeState::Off),
            STATE_HDR_ON => Some(EncodeState::HdrOn),
            STATE_HDR_OFF => Some(EncodeState::HdrOff),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_codes() {
        assert_eq!(PowerHint::from(0x2), PowerHint::Interaction);
        assert_eq!(PowerHint::from(0x8), PowerHint::Launch);
        assert_eq!(PowerHint::from(0x111), PowerHint::SetProfile);
        assert_eq!(PowerHint::from(0x1), PowerHint::Other(0x1));
        assert_eq!(PowerHint::Other(0x42).code(), 0x42);
        assert_eq!(PowerHint::VideoEncode.code(), 0x3);
    }

    #[test]
    fn test_encode_tokens() {
        assert_eq!(EncodeState::from_token("state=1"), Some(EncodeState::On));
        assert_eq!(EncodeState::from_token("state=0"), Some(EncodeState::Off));
        assert_eq!(EncodeState::from_token("state=2"), Some(EncodeState::HdrOn));
        assert_eq!(EncodeState::from_token("state=3"), Some(EncodeState::HdrOff));
        assert_eq!(EncodeState::from_token("state=10"), None);
        assert_eq!(EncodeState::from_token(""), None);
    }

    #[test]
    fn test_payload_accessors() {
        assert_eq!(HintData::Profile(2).profile(), Some(2));
        assert_eq!(HintData::Profile(2).token(), None);
        assert_eq!(HintData::Token("state=1").token(), Some("state=1"));
        assert_eq!(HintData::None.profile(), None);
    }
}

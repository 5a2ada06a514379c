/// Prefix shared by every playback-controller button custom id, so the
/// component dispatcher can cheaply recognise its own buttons.
pub const CONTROLLER_PREFIX: &str = "controller:";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerButton {
    PlayPause,
    Skip,
    Stop,
    Repeat,
    Autoplay,
    Lyrics,
    Queue,
    Shuffle,
    Filter,
    Favorite,
}

impl ControllerButton {
    #[must_use]
    pub const fn custom_id(self) -> &'static str {
        match self {
            Self::PlayPause => "controller:play_pause",
            Self::Skip => "controller:skip",
            Self::Stop => "controller:stop",
            Self::Repeat => "controller:repeat",
            Self::Autoplay => "controller:autoplay",
            Self::Lyrics => "controller:lyrics",
            Self::Queue => "controller:queue",
            Self::Shuffle => "controller:shuffle",
            Self::Filter => "controller:filter",
            Self::Favorite => "controller:favorite",
        }
    }

    #[must_use]
    pub fn from_custom_id(custom_id: &str) -> Option<Self> {
        let button = match custom_id {
            "controller:play_pause" => Self::PlayPause,
            "controller:skip" => Self::Skip,
            "controller:stop" => Self::Stop,
            "controller:repeat" => Self::Repeat,
            "controller:autoplay" => Self::Autoplay,
            "controller:lyrics" => Self::Lyrics,
            "controller:queue" => Self::Queue,
            "controller:shuffle" => Self::Shuffle,
            "controller:filter" => Self::Filter,
            "controller:favorite" => Self::Favorite,
            _ => return None,
        };
        Some(button)
    }
}

#[cfg(test)]
mod test {
    use rstest::rstest;

    use super::{ControllerButton, CONTROLLER_PREFIX};

    #[rstest]
    #[case(ControllerButton::PlayPause)]
    #[case(ControllerButton::Skip)]
    #[case(ControllerButton::Stop)]
    #[case(ControllerButton::Repeat)]
    #[case(ControllerButton::Autoplay)]
    #[case(ControllerButton::Lyrics)]
    #[case(ControllerButton::Queue)]
    #[case(ControllerButton::Shuffle)]
    #[case(ControllerButton::Filter)]
    #[case(ControllerButton::Favorite)]
    fn custom_ids_round_trip_and_carry_the_prefix(#[case] button: ControllerButton) {
        let id = button.custom_id();
        assert!(id.starts_with(CONTROLLER_PREFIX));
        assert_eq!(ControllerButton::from_custom_id(id), Some(button));
    }

    #[test]
    fn foreign_ids_are_rejected() {
        assert_eq!(ControllerButton::from_custom_id("controller:unknown"), None);
        assert_eq!(ControllerButton::from_custom_id("play_pause"), None);
    }
}

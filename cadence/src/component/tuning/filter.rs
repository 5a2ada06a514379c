use lavalink_rs::model::player::{Equalizer, Filters, Timescale, TremoloVibrato};
use twilight_interactions::command::{CommandModel, CommandOption, CreateCommand, CreateOption};

use crate::{
    command::{check, model::BotSlashCommand, require, SlashCtx},
    error::CommandResult,
};

#[derive(CommandOption, CreateOption, Clone, Copy)]
pub enum Preset {
    #[option(name = "Off", value = "off")]
    Off,
    #[option(name = "Nightcore", value = "nightcore")]
    Nightcore,
    #[option(name = "Vaporwave", value = "vaporwave")]
    Vaporwave,
    #[option(name = "Bass Boost", value = "bassboost")]
    BassBoost,
    #[option(name = "Tremolo", value = "tremolo")]
    Tremolo,
}

impl Preset {
    const fn description(self) -> &'static str {
        match self {
            Self::Off => "🎛️ Filters disabled.",
            Self::Nightcore => "🎛️ Nightcore enabled.",
            Self::Vaporwave => "🎛️ Vaporwave enabled.",
            Self::BassBoost => "🎛️ Bass boost enabled.",
            Self::Tremolo => "🎛️ Tremolo enabled.",
        }
    }

    /// The playback rate this preset implies, mirrored into the session
    /// clock so elapsed-time displays stay truthful.
    const fn speed(self) -> f64 {
        match self {
            Self::Nightcore => 1.2,
            Self::Vaporwave => 0.85,
            _ => 1.0,
        }
    }

    fn filters(self) -> Filters {
        match self {
            Self::Off => Filters::default(),
            Self::Nightcore => Filters {
                timescale: Some(Timescale {
                    speed: Some(1.2),
                    pitch: Some(1.15),
                    rate: None,
                }),
                ..Default::default()
            },
            Self::Vaporwave => Filters {
                timescale: Some(Timescale {
                    speed: Some(0.85),
                    pitch: Some(0.85),
                    rate: None,
                }),
                ..Default::default()
            },
            Self::BassBoost => Filters {
                equalizer: Some(
                    (0u8..=5)
                        .map(|band| Equalizer {
                            band,
                            gain: 0.2 - f64::from(band) * 0.03,
                        })
                        .collect(),
                ),
                ..Default::default()
            },
            Self::Tremolo => Filters {
                tremolo: Some(TremoloVibrato {
                    frequency: Some(4.0),
                    depth: Some(0.75),
                }),
                ..Default::default()
            },
        }
    }
}

/// Applies an audio filter preset.
#[derive(CommandModel, CreateCommand)]
#[command(name = "filter", desc = "Applies an audio filter preset.", contexts = "guild")]
pub struct Filter {
    /// The preset to apply.
    preset: Preset,
}

impl BotSlashCommand for Filter {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        check::user_in_bot_voice(&ctx)?;
        let player = require::player(&ctx)?;
        let data = player.data();

        player.context.set_filters(self.preset.filters()).await?;
        data.write().await.set_speed(self.preset.speed());

        ctx.out(self.preset.description()).await?;
        Ok(())
    }
}

//! Command-line parsing.
//!
//! A command is `[hs] <name> [<sub>] key:value key:"value with spaces" ...`.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use super::CommandError;
use crate::convert::parse_duration;
use crate::models::PlanetType;
use crate::research::{parse_blueprints, BlueprintLists, MAX_TIER};

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Test,
    Help,
    AddPlanet {
        name: String,
        level: u32,
        planet_type: PlanetType,
        tier: u8,
        discriminator: String,
    },
    UpgradePlanet {
        name: String,
        /// Seconds; 0 when omitted or unparseable.
        duration: i64,
    },
    ShiftUpgrades {
        duration: i64,
    },
    ListPlanets,
    UpgradeDetails,
    ArtifactCount {
        art_level: u8,
        blueprints: BlueprintLists,
    },
    SetPingWhenUpgraded(bool),
    ViewSettings,
}

impl Command {
    /// Whether the command changes the player's record.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Command::AddPlanet { .. }
                | Command::UpgradePlanet { .. }
                | Command::ShiftUpgrades { .. }
                | Command::SetPingWhenUpgraded(_)
        )
    }

    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let (words, mut args) = tokenize(line)?;
        let mut words = words.iter().map(String::as_str);

        let mut head = words.next();
        if head == Some("hs") {
            head = words.next();
        }
        let name = head.ok_or(CommandError::Empty)?;

        let command = match name {
            "test" => Command::Test,
            "help" => Command::Help,
            "add_planet" => Command::AddPlanet {
                name: args.name("planet_name")?,
                level: args.ranged("level", 1, 50)?,
                planet_type: args.planet_type("ptype")?,
                tier: args.ranged("tier", 1, 4)? as u8,
                discriminator: args.discriminator()?,
            },
            "upgrade_planet" => Command::UpgradePlanet {
                name: args.name("planet_name")?,
                duration: args.optional("duration").map(|d| parse_duration(&d)).unwrap_or(0),
            },
            "shift_upgrades" => Command::ShiftUpgrades {
                duration: parse_duration(&args.required("duration")?),
            },
            "list_planets" => Command::ListPlanets,
            "upgrade_details" => Command::UpgradeDetails,
            "artifact_count" => Command::ArtifactCount {
                art_level: args.ranged("art_level", 1, MAX_TIER as u32)? as u8,
                blueprints: [
                    parse_blueprints(&args.required("trade")?),
                    parse_blueprints(&args.required("mining")?),
                    parse_blueprints(&args.required("weapons")?),
                    parse_blueprints(&args.required("shields")?),
                    parse_blueprints(&args.required("support")?),
                ],
            },
            "settings" => match words.next() {
                Some("ping_upgraded") => Command::SetPingWhenUpgraded(args.flag("flag")?),
                Some("view") => Command::ViewSettings,
                Some(other) => return Err(CommandError::Unknown(format!("settings {}", other))),
                None => return Err(CommandError::Unknown("settings".to_string())),
            },
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        if let Some(extra) = words.next() {
            return Err(CommandError::UnexpectedWord(extra.to_string()));
        }
        args.finish()?;
        Ok(command)
    }
}

fn arg_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"([A-Za-z_]+):(?:"([^"]*)"|(\S+))"#).expect("argument pattern is valid")
    })
}

/// Split a line into leading command words and `key:value` arguments.
fn tokenize(line: &str) -> Result<(Vec<String>, Args), CommandError> {
    let line = line.trim().trim_start_matches('/');
    let mut values = HashMap::new();
    let mut head_end = line.len();
    let mut last_end = None;

    for caps in arg_pattern().captures_iter(line) {
        let Some(whole) = caps.get(0) else { continue };
        match last_end {
            None => head_end = whole.start(),
            Some(end) => {
                let between = &line[end..whole.start()];
                if !between.trim().is_empty() {
                    return Err(CommandError::Syntax(between.trim().to_string()));
                }
            }
        }
        last_end = Some(whole.end());

        let key = caps[1].to_lowercase();
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        if values.insert(key.clone(), value).is_some() {
            return Err(CommandError::DuplicateArgument(key));
        }
    }

    if let Some(end) = last_end {
        let trailing = line[end..].trim();
        if !trailing.is_empty() {
            return Err(CommandError::Syntax(trailing.to_string()));
        }
    }

    let words = line[..head_end]
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    Ok((words, Args { values }))
}

/// Named arguments, consumed as the command reads them.
#[derive(Debug, Default)]
struct Args {
    values: HashMap<String, String>,
}

impl Args {
    fn optional(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }

    fn required(&mut self, name: &'static str) -> Result<String, CommandError> {
        self.optional(name).ok_or(CommandError::MissingArgument(name))
    }

    fn name(&mut self, name: &'static str) -> Result<String, CommandError> {
        let raw = self.required(name)?;
        if raw.trim().is_empty() {
            return Err(CommandError::InvalidArgument {
                name,
                value: raw,
                expected: "a non-empty name".to_string(),
            });
        }
        Ok(raw)
    }

    fn ranged(&mut self, name: &'static str, min: u32, max: u32) -> Result<u32, CommandError> {
        let raw = self.required(name)?;
        match raw.trim().parse::<u32>() {
            Ok(v) if (min..=max).contains(&v) => Ok(v),
            _ => Err(CommandError::InvalidArgument {
                name,
                value: raw,
                expected: format!("a whole number from {} to {}", min, max),
            }),
        }
    }

    fn planet_type(&mut self, name: &'static str) -> Result<PlanetType, CommandError> {
        let raw = self.required(name)?;
        raw.parse().map_err(|_| CommandError::InvalidArgument {
            name,
            value: raw,
            expected: "one of desert, fire, water, terran, gas, ice".to_string(),
        })
    }

    fn discriminator(&mut self) -> Result<String, CommandError> {
        match self.optional("discriminator") {
            None => Ok(String::new()),
            Some(raw) => match raw.trim().to_lowercase().as_str() {
                d @ ("a" | "b") => Ok(d.to_string()),
                _ => Err(CommandError::InvalidArgument {
                    name: "discriminator",
                    value: raw,
                    expected: "a or b".to_string(),
                }),
            },
        }
    }

    fn flag(&mut self, name: &'static str) -> Result<bool, CommandError> {
        let raw = self.required(name)?;
        match raw.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(CommandError::InvalidArgument {
                name,
                value: raw,
                expected: "true or false".to_string(),
            }),
        }
    }

    fn finish(self) -> Result<(), CommandError> {
        let mut leftover: Vec<String> = self.values.into_keys().collect();
        leftover.sort();
        match leftover.into_iter().next() {
            Some(key) => Err(CommandError::UnexpectedArgument(key)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_planet() {
        let cmd = Command::parse(
            r#"hs add_planet planet_name:"Big Rock" level:5 ptype:Terran tier:1"#,
        )
        .unwrap();
        assert_eq!(
            cmd,
            Command::AddPlanet {
                name: "Big Rock".to_string(),
                level: 5,
                planet_type: PlanetType::Terran,
                tier: 1,
                discriminator: String::new(),
            }
        );
        assert!(cmd.is_mutating());
    }

    #[test]
    fn test_parse_add_planet_discriminator() {
        let cmd = Command::parse(
            "add_planet planet_name:Frost level:3 ptype:ice tier:4 discriminator:B",
        )
        .unwrap();
        assert!(matches!(cmd, Command::AddPlanet { ref discriminator, .. } if discriminator == "b"));

        let err = Command::parse("add_planet planet_name:Frost level:3 ptype:ice tier:4 discriminator:c")
            .unwrap_err();
        assert!(matches!(err, CommandError::InvalidArgument { name: "discriminator", .. }));
    }

    #[test]
    fn test_parse_add_planet_ranges() {
        let err = Command::parse("add_planet planet_name:X level:51 ptype:gas tier:2").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value '51' for level: expected a whole number from 1 to 50."
        );

        let err = Command::parse("add_planet planet_name:X level:5 ptype:gas tier:0").unwrap_err();
        assert!(matches!(err, CommandError::InvalidArgument { name: "tier", .. }));

        let err = Command::parse("add_planet planet_name:X level:5 ptype:lava tier:2").unwrap_err();
        assert!(matches!(err, CommandError::InvalidArgument { name: "ptype", .. }));
    }

    #[test]
    fn test_parse_blank_planet_name() {
        let err = Command::parse(r#"add_planet planet_name:"   " level:5 ptype:gas tier:2"#)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value '   ' for planet_name: expected a non-empty name."
        );

        let err = Command::parse(r#"upgrade_planet planet_name:"" duration:1h"#).unwrap_err();
        assert!(matches!(err, CommandError::InvalidArgument { name: "planet_name", .. }));
    }

    #[test]
    fn test_parse_upgrade_duration() {
        let cmd = Command::parse(r#"upgrade_planet planet_name:Dune duration:"1d 2h""#).unwrap();
        assert_eq!(
            cmd,
            Command::UpgradePlanet {
                name: "Dune".to_string(),
                duration: 93_600
            }
        );

        let cmd = Command::parse("upgrade_planet planet_name:Dune").unwrap();
        assert!(matches!(cmd, Command::UpgradePlanet { duration: 0, .. }));

        let cmd = Command::parse("upgrade_planet planet_name:Dune duration:soon").unwrap();
        assert!(matches!(cmd, Command::UpgradePlanet { duration: 0, .. }));
    }

    #[test]
    fn test_parse_shift() {
        let cmd = Command::parse("shift_upgrades duration:2h").unwrap();
        assert_eq!(cmd, Command::ShiftUpgrades { duration: 7_200 });

        let err = Command::parse("shift_upgrades").unwrap_err();
        assert_eq!(err, CommandError::MissingArgument("duration"));
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(Command::parse("list_planets").unwrap(), Command::ListPlanets);
        assert_eq!(Command::parse("/hs upgrade_details").unwrap(), Command::UpgradeDetails);
        assert_eq!(Command::parse("TEST").unwrap(), Command::Test);
        assert!(!Command::ListPlanets.is_mutating());
    }

    #[test]
    fn test_parse_settings() {
        assert_eq!(
            Command::parse("settings ping_upgraded flag:yes").unwrap(),
            Command::SetPingWhenUpgraded(true)
        );
        assert_eq!(Command::parse("hs settings view").unwrap(), Command::ViewSettings);
        assert!(matches!(
            Command::parse("settings"),
            Err(CommandError::Unknown(_))
        ));
        assert!(matches!(
            Command::parse("settings ping_upgraded flag:maybe"),
            Err(CommandError::InvalidArgument { name: "flag", .. })
        ));
    }

    #[test]
    fn test_parse_artifact_count() {
        let cmd = Command::parse(
            r#"artifact_count art_level:4 trade:"1 2 x" mining:3 weapons:"" shields:"0 0" support:5"#,
        )
        .unwrap();
        let Command::ArtifactCount { art_level, blueprints } = cmd else {
            panic!("expected artifact_count");
        };
        assert_eq!(art_level, 4);
        assert_eq!(blueprints[0], vec![Some(1), Some(2), None]);
        assert!(blueprints[2].is_empty());
        assert_eq!(blueprints[3], vec![Some(0), Some(0)]);

        let err = Command::parse("artifact_count art_level:12 trade:1 mining:1 weapons:1 shields:1 support:1")
            .unwrap_err();
        assert!(matches!(err, CommandError::InvalidArgument { name: "art_level", .. }));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Command::parse("   ").unwrap_err(), CommandError::Empty);
        assert_eq!(
            Command::parse("launch").unwrap_err(),
            CommandError::Unknown("launch".to_string())
        );
        assert_eq!(
            Command::parse("list_planets verbose:true").unwrap_err(),
            CommandError::UnexpectedArgument("verbose".to_string())
        );
        assert_eq!(
            Command::parse("list_planets now").unwrap_err(),
            CommandError::UnexpectedWord("now".to_string())
        );
        assert_eq!(
            Command::parse("shift_upgrades duration:1h duration:2h").unwrap_err(),
            CommandError::DuplicateArgument("duration".to_string())
        );
        assert_eq!(
            Command::parse("upgrade_planet planet_name:Dune oops duration:1h").unwrap_err(),
            CommandError::Syntax("oops".to_string())
        );
    }
}

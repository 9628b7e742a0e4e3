//! Team formations and per-role reference points
//!
//! Homes are given for the left-hand (canonical) team. Role 0 is always the
//! goalie.

use std::str::FromStr;

use super::geometry::Vec2;

/// Line a field player belongs to; decides how far it shifts with play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Goalie,
    Defender,
    Midfielder,
    Attacker,
}

impl Line {
    /// (defensive, offensive) X shifts relative to home
    fn shifts(self) -> (f64, f64) {
        match self {
            Line::Goalie => (0.0, 0.0),
            Line::Defender => (20.0, 20.0),
            Line::Midfielder => (15.0, 30.0),
            Line::Attacker => (15.0, 40.0),
        }
    }
}

/// One slot in a formation
#[derive(Debug, Clone, Copy)]
pub struct Slot {
    pub home: Vec2,
    pub line: Line,
    /// Placed next to the ball by the server at kick-offs
    pub kicker: bool,
}

/// Reference points for one role, fixed for the lifetime of the agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoleTargets {
    pub home: Vec2,
    pub offense: Vec2,
    pub defense: Vec2,
}

impl RoleTargets {
    pub fn for_slot(slot: &Slot) -> Self {
        let (def_dx, off_dx) = slot.line.shifts();
        Self {
            home: slot.home,
            offense: Vec2::new(slot.home.x + off_dx, slot.home.y),
            defense: Vec2::new(slot.home.x - def_dx, slot.home.y),
        }
    }
}

/// Supported formations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormationKind {
    F433,
    F523,
    F343,
}

impl FromStr for FormationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "433" => Ok(Self::F433),
            "523" => Ok(Self::F523),
            "343" => Ok(Self::F343),
            other => Err(other.to_string()),
        }
    }
}

impl std::fmt::Display for FormationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::F433 => "433",
            Self::F523 => "523",
            Self::F343 => "343",
        };
        write!(f, "{}", name)
    }
}

/// A full team layout
#[derive(Debug, Clone)]
pub struct Formation {
    slots: Vec<Slot>,
}

fn slot(x: f64, y: f64, line: Line) -> Slot {
    Slot {
        home: Vec2::new(x, y),
        line,
        kicker: false,
    }
}

fn kicker(x: f64, y: f64) -> Slot {
    Slot {
        home: Vec2::new(x, y),
        line: Line::Attacker,
        kicker: true,
    }
}

impl Formation {
    pub fn new(kind: FormationKind) -> Self {
        use Line::*;

        let goalie = slot(-48.0, 0.0, Goalie);
        let back_three = [
            slot(-33.0, 20.0, Defender),
            slot(-35.0, 0.0, Defender),
            slot(-33.0, -20.0, Defender),
        ];

        let mut slots = vec![goalie];
        slots.extend(back_three);

        match kind {
            FormationKind::F433 => slots.extend([
                slot(-17.0, 25.0, Midfielder),
                slot(-22.0, 0.0, Midfielder),
                slot(-17.0, -25.0, Midfielder),
                slot(-1.5, 20.0, Attacker),
                kicker(-1.5, 8.0),
                slot(-1.5, -8.0, Attacker),
                slot(-1.5, -20.0, Attacker),
            ]),
            // The "W"
            FormationKind::F523 => slots.extend([
                slot(-17.0, 18.0, Midfielder),
                slot(-17.0, -18.0, Midfielder),
                slot(-1.5, 26.0, Attacker),
                slot(-10.0, 10.0, Attacker),
                kicker(-3.0, 0.0),
                slot(-10.0, -10.0, Attacker),
                slot(-1.5, -26.0, Attacker),
            ]),
            FormationKind::F343 => slots.extend([
                slot(-17.0, 20.0, Midfielder),
                slot(-22.0, 8.0, Midfielder),
                slot(-22.0, -8.0, Midfielder),
                slot(-17.0, -20.0, Midfielder),
                slot(-1.5, 18.0, Attacker),
                kicker(-1.5, 0.0),
                slot(-1.5, -18.0, Attacker),
            ]),
        }

        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, role: usize) -> Option<&Slot> {
        self.slots.get(role)
    }

    pub fn is_goalie(role: usize) -> bool {
        role == 0
    }

    /// Reference points for a role; `None` if the role is out of range
    pub fn targets(&self, role: usize) -> Option<RoleTargets> {
        self.slot(role).map(RoleTargets::for_slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_formation_has_eleven_slots_and_one_kicker() {
        for kind in [FormationKind::F433, FormationKind::F523, FormationKind::F343] {
            let f = Formation::new(kind);
            assert_eq!(f.len(), 11, "{}", kind);
            assert_eq!(f.slots.iter().filter(|s| s.kicker).count(), 1, "{}", kind);
            assert_eq!(f.slot(0).map(|s| s.line), Some(Line::Goalie));
        }
    }

    #[test]
    fn targets_shift_by_line() {
        let f = Formation::new(FormationKind::F343);

        let goalie = f.targets(0).unwrap();
        assert_eq!(goalie.home, goalie.offense);
        assert_eq!(goalie.home, goalie.defense);

        let defender = f.targets(2).unwrap();
        assert_eq!(defender.offense, Vec2::new(-15.0, 0.0));
        assert_eq!(defender.defense, Vec2::new(-55.0, 0.0));

        let midfielder = f.targets(5).unwrap();
        assert_eq!(midfielder.offense, Vec2::new(8.0, 8.0));
        assert_eq!(midfielder.defense, Vec2::new(-37.0, 8.0));

        let attacker = f.targets(9).unwrap();
        assert_eq!(attacker.offense, Vec2::new(38.5, 0.0));
        assert_eq!(attacker.defense, Vec2::new(-16.5, 0.0));

        assert!(f.targets(11).is_none());
    }

    #[test]
    fn parses_names() {
        assert_eq!("523".parse::<FormationKind>(), Ok(FormationKind::F523));
        assert!("442".parse::<FormationKind>().is_err());
        assert_eq!(FormationKind::F433.to_string(), "433");
    }
}

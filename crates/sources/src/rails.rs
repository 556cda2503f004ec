//! Curated explore rails.
//!
//! Each rail is a named shelf backed by a fixed search query.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CuratedRail {
    TrendingThisWeek,
    CriticallyAcclaimed,
    CozyFantasyPicks,
    DarkAcademia,
}

impl CuratedRail {
    pub fn all() -> [CuratedRail; 4] {
        [
            CuratedRail::TrendingThisWeek,
            CuratedRail::CriticallyAcclaimed,
            CuratedRail::CozyFantasyPicks,
            CuratedRail::DarkAcademia,
        ]
    }

    pub fn title(&self) -> &'static str {
        match self {
            CuratedRail::TrendingThisWeek => "Trending This Week",
            CuratedRail::CriticallyAcclaimed => "Critically Acclaimed",
            CuratedRail::CozyFantasyPicks => "Cozy Fantasy Picks",
            CuratedRail::DarkAcademia => "Dark Academia",
        }
    }

    /// Short name used on the command line.
    pub fn slug(&self) -> &'static str {
        match self {
            CuratedRail::TrendingThisWeek => "trending",
            CuratedRail::CriticallyAcclaimed => "acclaimed",
            CuratedRail::CozyFantasyPicks => "cozy-fantasy",
            CuratedRail::DarkAcademia => "dark-academia",
        }
    }

    pub fn query(&self) -> &'static str {
        match self {
            CuratedRail::TrendingThisWeek => "bestseller new releases",
            CuratedRail::CriticallyAcclaimed => "award winning literary fiction",
            CuratedRail::CozyFantasyPicks => "cozy fantasy",
            CuratedRail::DarkAcademia => "dark academia",
        }
    }
}

impl fmt::Display for CuratedRail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for CuratedRail {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        CuratedRail::all()
            .into_iter()
            .find(|rail| rail.slug() == wanted || rail.title().to_lowercase() == wanted)
            .ok_or_else(|| {
                let known: Vec<_> = CuratedRail::all().iter().map(|r| r.slug()).collect();
                format!("unknown rail '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_by_slug_or_title() {
        assert_eq!("dark-academia".parse(), Ok(CuratedRail::DarkAcademia));
        assert_eq!("Cozy Fantasy Picks".parse(), Ok(CuratedRail::CozyFantasyPicks));
        assert!("nope".parse::<CuratedRail>().is_err());
    }
}

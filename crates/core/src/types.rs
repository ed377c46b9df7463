use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub const ORIGIN: Pos = Pos { y: 0, x: 0 };

    pub fn offset(self, dy: i32, dx: i32) -> Pos {
        Pos { y: self.y + dy, x: self.x + dx }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CellKind {
    Skip,
    Wall,
    Floor,
    Door,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DesignLabel {
    Default,
    Fire,
    Ice,
    Forest,
}

impl DesignLabel {
    pub const ALL: [DesignLabel; 4] =
        [DesignLabel::Default, DesignLabel::Fire, DesignLabel::Ice, DesignLabel::Forest];

    /// Uniform draw over all design labels.
    pub fn pick_random(rng: &mut rand_chacha::ChaCha8Rng) -> DesignLabel {
        use rand_chacha::rand_core::Rng;
        Self::ALL[(rng.next_u64() as usize) % Self::ALL.len()]
    }
}

impl std::str::FromStr for DesignLabel {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "default" => Ok(DesignLabel::Default),
            "fire" => Ok(DesignLabel::Fire),
            "ice" => Ok(DesignLabel::Ice),
            "forest" => Ok(DesignLabel::Forest),
            other => Err(format!("unknown design label '{other}'")),
        }
    }
}

use std::fmt;
use std::time::Duration;

use engine::{DrawLayer, Vec2};
use serde::Serialize;

pub(crate) const TILE_SIZE: i32 = 64;
pub(crate) const TILE_SIZE_PX: f32 = TILE_SIZE as f32;
pub(crate) const ANIMATION_SPEED: f32 = 8.0;
pub(crate) const WINDOW_WIDTH: f32 = 1280.0;
pub(crate) const WINDOW_HEIGHT: f32 = 720.0;

pub(crate) const SCROLL_STEP_PX: f32 = 50.0;
pub(crate) const OBJECT_PLACE_DEBOUNCE: Duration = Duration::from_millis(400);
pub(crate) const SCENE_SWITCH_DEBOUNCE: Duration = Duration::from_millis(500);

pub(crate) const PALETTE_FIRST: KindId = KindId(2);
pub(crate) const PALETTE_LAST: KindId = KindId(18);

pub(crate) const PLAYER_SPAWN_CENTER: Vec2 = Vec2::new(200.0, WINDOW_HEIGHT / 2.0);
pub(crate) const SKY_ANCHOR_CENTER: Vec2 = Vec2::new(WINDOW_WIDTH / 2.0, WINDOW_HEIGHT / 2.0);

/// Numeric id shared by the palette, the canvas and the compiled grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub(crate) struct KindId(pub u8);

impl fmt::Display for KindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Facing {
    Left,
    Right,
}

impl Facing {
    pub(crate) fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub(crate) fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Facing::Left => "left",
            Facing::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum CoinKind {
    Gold,
    Silver,
    Diamond,
}

impl CoinKind {
    pub(crate) fn kind_id(self) -> KindId {
        match self {
            CoinKind::Gold => KindId(4),
            CoinKind::Silver => KindId(5),
            CoinKind::Diamond => KindId(6),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum EnemyKind {
    Spikes,
    Tooth,
    Shell(Facing),
}

impl EnemyKind {
    pub(crate) fn kind_id(self) -> KindId {
        match self {
            EnemyKind::Spikes => KindId(7),
            EnemyKind::Tooth => KindId(8),
            EnemyKind::Shell(Facing::Left) => KindId(9),
            EnemyKind::Shell(Facing::Right) => KindId(10),
        }
    }
}

/// What a kind is on the canvas. Tile styles snap to cells; the rest are
/// free-floating objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KindStyle {
    Player,
    Sky,
    Terrain,
    Water,
    Coin(CoinKind),
    Enemy(EnemyKind),
    Palm { background: bool },
}

impl KindStyle {
    pub(crate) fn is_tile(self) -> bool {
        matches!(
            self,
            KindStyle::Terrain | KindStyle::Water | KindStyle::Coin(_) | KindStyle::Enemy(_)
        )
    }

    pub(crate) fn is_protected(self) -> bool {
        matches!(self, KindStyle::Player | KindStyle::Sky)
    }
}

/// Invisible collider emplaced next to a palm, relative to the palm's top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BlockSpec {
    pub(crate) offset: Vec2,
    pub(crate) size: Vec2,
}

const PALM_BLOCK: BlockSpec = BlockSpec {
    offset: Vec2::ZERO,
    size: Vec2::new(76.0, 50.0),
};

const PALM_RIGHT_BLOCK: BlockSpec = BlockSpec {
    offset: Vec2::new(50.0, 0.0),
    size: Vec2::new(76.0, 50.0),
};

/// How the level builder turns a grid tag into runtime entities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum SpawnRule {
    Player,
    Horizon,
    Terrain,
    Water,
    Coin(CoinKind),
    Spikes,
    Tooth,
    Shell(Facing),
    Palm {
        layer: DrawLayer,
        block: Option<BlockSpec>,
    },
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct KindDescriptor {
    pub(crate) id: KindId,
    pub(crate) name: &'static str,
    pub(crate) style: KindStyle,
    /// Frame sequence shown for this kind on the canvas.
    pub(crate) preview: &'static str,
    pub(crate) spawn: SpawnRule,
}

const fn palm(
    id: u8,
    name: &'static str,
    preview: &'static str,
    background: bool,
    block: Option<BlockSpec>,
) -> KindDescriptor {
    KindDescriptor {
        id: KindId(id),
        name,
        style: KindStyle::Palm { background },
        preview,
        spawn: SpawnRule::Palm {
            layer: if background {
                DrawLayer::Background
            } else {
                DrawLayer::Main
            },
            block,
        },
    }
}

pub(crate) const KIND_TABLE: [KindDescriptor; 19] = [
    KindDescriptor {
        id: KindId(0),
        name: "player",
        style: KindStyle::Player,
        preview: "player/idle_right",
        spawn: SpawnRule::Player,
    },
    KindDescriptor {
        id: KindId(1),
        name: "sky",
        style: KindStyle::Sky,
        preview: "sky/handle",
        spawn: SpawnRule::Horizon,
    },
    KindDescriptor {
        id: KindId(2),
        name: "terrain",
        style: KindStyle::Terrain,
        preview: "land/X",
        spawn: SpawnRule::Terrain,
    },
    KindDescriptor {
        id: KindId(3),
        name: "water",
        style: KindStyle::Water,
        preview: "water/top",
        spawn: SpawnRule::Water,
    },
    KindDescriptor {
        id: KindId(4),
        name: "coin_gold",
        style: KindStyle::Coin(CoinKind::Gold),
        preview: "coin/gold",
        spawn: SpawnRule::Coin(CoinKind::Gold),
    },
    KindDescriptor {
        id: KindId(5),
        name: "coin_silver",
        style: KindStyle::Coin(CoinKind::Silver),
        preview: "coin/silver",
        spawn: SpawnRule::Coin(CoinKind::Silver),
    },
    KindDescriptor {
        id: KindId(6),
        name: "coin_diamond",
        style: KindStyle::Coin(CoinKind::Diamond),
        preview: "coin/diamond",
        spawn: SpawnRule::Coin(CoinKind::Diamond),
    },
    KindDescriptor {
        id: KindId(7),
        name: "spikes",
        style: KindStyle::Enemy(EnemyKind::Spikes),
        preview: "spikes",
        spawn: SpawnRule::Spikes,
    },
    KindDescriptor {
        id: KindId(8),
        name: "tooth",
        style: KindStyle::Enemy(EnemyKind::Tooth),
        preview: "tooth/run_left",
        spawn: SpawnRule::Tooth,
    },
    KindDescriptor {
        id: KindId(9),
        name: "shell_left",
        style: KindStyle::Enemy(EnemyKind::Shell(Facing::Left)),
        preview: "shell_left/idle",
        spawn: SpawnRule::Shell(Facing::Left),
    },
    KindDescriptor {
        id: KindId(10),
        name: "shell_right",
        style: KindStyle::Enemy(EnemyKind::Shell(Facing::Right)),
        preview: "shell_right/idle",
        spawn: SpawnRule::Shell(Facing::Right),
    },
    palm(11, "palm_small_fg", "palm/small_fg", false, Some(PALM_BLOCK)),
    palm(12, "palm_large_fg", "palm/large_fg", false, Some(PALM_BLOCK)),
    palm(13, "palm_left_fg", "palm/left_fg", false, Some(PALM_BLOCK)),
    palm(14, "palm_right_fg", "palm/right_fg", false, Some(PALM_RIGHT_BLOCK)),
    palm(15, "palm_small_bg", "palm/small_bg", true, None),
    palm(16, "palm_large_bg", "palm/large_bg", true, None),
    palm(17, "palm_left_bg", "palm/left_bg", true, None),
    palm(18, "palm_right_bg", "palm/right_bg", true, None),
];

pub(crate) fn descriptor(kind: KindId) -> Option<&'static KindDescriptor> {
    KIND_TABLE.get(usize::from(kind.0))
}

pub(crate) fn style_of(kind: KindId) -> Option<KindStyle> {
    descriptor(kind).map(|descriptor| descriptor.style)
}

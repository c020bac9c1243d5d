use std::time::Duration;

use engine::{
    DrawLayer, EntityId, EntityIdAllocator, FrameSequence, InputSnapshot, Rect, RenderableDesc,
    Vec2,
};
use tracing::debug;

use super::enemies::{Pearl, Shell, Spikes, Tooth};
use super::player::Player;
use super::props::{Coin, Decor, Particle};
use crate::app::settings::CoinKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColliderSource {
    Terrain,
    Block,
    Shell,
}

/// Static solid box the player and walkers are resolved against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Collider {
    pub(crate) rect: Rect,
    pub(crate) source: ColliderSource,
}

impl Collider {
    /// Pearls pass through other shells.
    fn stops_pearls(&self) -> bool {
        matches!(self.source, ColliderSource::Terrain | ColliderSource::Block)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LevelSystemId {
    Input,
    Ai,
    Physics,
    Collision,
    Animation,
    Cleanup,
}

impl LevelSystemId {
    #[cfg(test)]
    fn name(self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Ai => "Ai",
            Self::Physics => "Physics",
            Self::Collision => "Collision",
            Self::Animation => "Animation",
            Self::Cleanup => "Cleanup",
        }
    }
}

const LEVEL_SYSTEM_ORDER: [LevelSystemId; 6] = [
    LevelSystemId::Input,
    LevelSystemId::Ai,
    LevelSystemId::Physics,
    LevelSystemId::Collision,
    LevelSystemId::Animation,
    LevelSystemId::Cleanup,
];

/// What happened during one tick, for the scene's bookkeeping.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TickReport {
    pub(crate) coins_collected: Vec<CoinKind>,
    pub(crate) hits_taken: u32,
    pub(crate) pearls_fired: u32,
}

/// Every live entity of a running level.
#[derive(Debug)]
pub(crate) struct EntityWorld {
    pub(crate) player: Player,
    pub(crate) colliders: Vec<Collider>,
    pub(crate) decor: Vec<Decor>,
    pub(crate) coins: Vec<Coin>,
    pub(crate) spikes: Vec<Spikes>,
    pub(crate) teeth: Vec<Tooth>,
    pub(crate) shells: Vec<Shell>,
    pub(crate) pearls: Vec<Pearl>,
    /// Pearls fired this tick; they join `pearls` after physics.
    launched: Vec<Pearl>,
    pub(crate) particles: Vec<Particle>,
    pub(crate) ids: EntityIdAllocator,
    pub(crate) pearl_frames: FrameSequence,
    pub(crate) particle_frames: FrameSequence,
    last_tick_order: Vec<LevelSystemId>,
}

impl EntityWorld {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        player: Player,
        colliders: Vec<Collider>,
        decor: Vec<Decor>,
        coins: Vec<Coin>,
        spikes: Vec<Spikes>,
        teeth: Vec<Tooth>,
        shells: Vec<Shell>,
        ids: EntityIdAllocator,
        pearl_frames: FrameSequence,
        particle_frames: FrameSequence,
    ) -> Self {
        Self {
            player,
            colliders,
            decor,
            coins,
            spikes,
            teeth,
            shells,
            pearls: Vec::new(),
            launched: Vec::new(),
            particles: Vec::new(),
            ids,
            pearl_frames,
            particle_frames,
            last_tick_order: Vec::new(),
        }
    }

    pub(crate) fn entity_count(&self) -> usize {
        1 + self.decor.len()
            + self.coins.len()
            + self.spikes.len()
            + self.teeth.len()
            + self.shells.len()
            + self.pearls.len()
            + self.particles.len()
    }

    pub(crate) fn tick(&mut self, dt: Duration, input: &InputSnapshot) -> TickReport {
        let mut report = TickReport::default();
        self.last_tick_order.clear();
        for system_id in LEVEL_SYSTEM_ORDER {
            self.last_tick_order.push(system_id);
            self.run_system(system_id, dt, input, &mut report);
        }
        report
    }

    fn run_system(
        &mut self,
        system_id: LevelSystemId,
        dt: Duration,
        input: &InputSnapshot,
        report: &mut TickReport,
    ) {
        match system_id {
            LevelSystemId::Input => self.player.apply_input(input),
            LevelSystemId::Ai => self.run_ai(dt, report),
            LevelSystemId::Physics => {
                self.player.step(dt, &self.colliders);
                for pearl in &mut self.pearls {
                    pearl.update(dt);
                }
                self.pearls.append(&mut self.launched);
            }
            LevelSystemId::Collision => self.run_collision(report),
            LevelSystemId::Animation => {
                for decor in &mut self.decor {
                    decor.animate(dt);
                }
                for coin in &mut self.coins {
                    coin.animate(dt);
                }
                for particle in &mut self.particles {
                    particle.animate(dt);
                }
            }
            LevelSystemId::Cleanup => {
                self.pearls.retain(Pearl::is_alive);
                self.particles.retain(|particle| !particle.is_finished());
            }
        }
    }

    fn target_centre(&self, target: Option<EntityId>) -> Option<Vec2> {
        target
            .filter(|id| *id == self.player.id)
            .map(|_| self.player.hitbox.center())
    }

    fn run_ai(&mut self, dt: Duration, report: &mut TickReport) {
        let mut spawns = Vec::new();
        for index in 0..self.shells.len() {
            let target = self.target_centre(self.shells[index].target);
            if let Some(spawn) = self.shells[index].update(dt, target) {
                spawns.push((self.shells[index].id, spawn));
            }
        }
        for (shell, spawn) in spawns {
            let pearl = Pearl::new(self.ids.allocate(), spawn, &self.pearl_frames);
            debug!(
                shell = shell.0,
                pearl = pearl.id.0,
                facing = spawn.facing.as_str(),
                "pearl_fired"
            );
            self.launched.push(pearl);
            report.pearls_fired += 1;
        }

        for tooth in &mut self.teeth {
            tooth.walk(dt, &self.colliders);
        }
    }

    fn run_collision(&mut self, report: &mut TickReport) {
        for pearl in &mut self.pearls {
            if self
                .colliders
                .iter()
                .any(|c| c.stops_pearls() && c.rect.overlaps(&pearl.visual_box))
            {
                pearl.mark_collided();
            }
        }

        let player_box = self.player.visual_box;
        let mut collected = Vec::new();
        self.coins.retain(|coin| {
            if coin.visual_box.overlaps(&player_box) {
                collected.push((coin.id, coin.kind, coin.visual_box.center()));
                false
            } else {
                true
            }
        });
        for (id, kind, centre) in collected {
            debug!(coin = id.0, kind = ?kind, "coin_collected");
            self.particles
                .push(Particle::new(centre, self.particle_frames.clone()));
            report.coins_collected.push(kind);
        }

        let hitbox = self.player.hitbox;
        let mut source = self
            .spikes
            .iter()
            .find(|spikes| spikes.visual_box.overlaps(&hitbox))
            .map(|spikes| spikes.id)
            .or_else(|| {
                self.teeth
                    .iter()
                    .find(|tooth| tooth.visual_box.overlaps(&hitbox))
                    .map(|tooth| tooth.id)
            });
        for pearl in &mut self.pearls {
            if pearl.is_alive() && pearl.visual_box.overlaps(&hitbox) {
                pearl.mark_collided();
                source = source.or(Some(pearl.id));
            }
        }
        if let Some(source) = source {
            if self.player.damage() {
                debug!(source = source.0, "player_damaged");
                report.hits_taken += 1;
            }
        }
    }

    /// World-space renderables shifted by `camera_offset`, in submission order.
    pub(crate) fn renderables(&self, camera_offset: Vec2) -> Vec<RenderableDesc> {
        let shift = -camera_offset;
        let mut out = Vec::with_capacity(self.entity_count());
        for decor in &self.decor {
            out.push(RenderableDesc::new(
                decor.frame(),
                decor.visual_box.translated(shift),
                decor.layer,
            ));
        }
        let main = |frame, visual_box: Rect| {
            RenderableDesc::new(frame, visual_box.translated(shift), DrawLayer::Main)
        };
        out.extend(self.coins.iter().map(|coin| main(coin.frame(), coin.visual_box)));
        out.extend(self.spikes.iter().map(|spikes| main(spikes.frame, spikes.visual_box)));
        out.extend(self.teeth.iter().map(|tooth| main(tooth.frame(), tooth.visual_box)));
        out.extend(self.shells.iter().map(|shell| main(shell.frame(), shell.visual_box)));
        out.extend(self.pearls.iter().map(|pearl| main(pearl.frame(), pearl.visual_box)));
        out.extend(
            self.particles
                .iter()
                .map(|particle| main(particle.frame(), particle.visual_box)),
        );
        out.push(main(self.player.frame(), self.player.visual_box));
        out
    }
}

#[cfg(test)]
mod tests {
    use engine::InputAction;

    use super::*;
    use crate::app::assets::build_catalog;
    use crate::app::level::enemies::PearlSpawn;
    use crate::app::level::player::PlayerFrames;
    use crate::app::settings::Facing;

    const TICK: Duration = Duration::from_nanos(16_666_667);

    fn world_with_floor() -> EntityWorld {
        let library = build_catalog().expect("catalog");
        let mut ids = EntityIdAllocator::default();
        let player = Player::new(
            ids.allocate(),
            Vec2::new(100.0, 0.0),
            PlayerFrames::from_library(&library),
        );
        let floor = Collider {
            rect: Rect::new(-1000.0, 64.0, 4000.0, 64.0),
            source: ColliderSource::Terrain,
        };
        EntityWorld::new(
            player,
            vec![floor],
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            ids,
            library.get_or_placeholder("pearl", Vec2::new(16.0, 16.0)),
            library.get_or_placeholder("particle", Vec2::new(48.0, 48.0)),
        )
    }

    fn idle() -> InputSnapshot {
        InputSnapshot::empty()
    }

    #[test]
    fn systems_run_in_a_fixed_order() {
        let mut world = world_with_floor();
        world.tick(TICK, &idle());
        let names: Vec<_> = world.last_tick_order.iter().map(|id| id.name()).collect();
        assert_eq!(
            names,
            ["Input", "Ai", "Physics", "Collision", "Animation", "Cleanup"]
        );
    }

    #[test]
    fn walking_into_a_coin_collects_it_once() {
        let library = build_catalog().expect("catalog");
        let mut world = world_with_floor();
        let coin_frames = library.get_or_placeholder("coin/gold", Vec2::new(32.0, 32.0));
        let id = world.ids.allocate();
        world
            .coins
            .push(Coin::new(id, CoinKind::Gold, Vec2::new(260.0, 32.0), coin_frames));

        let mut collected = Vec::new();
        for _ in 0..60 {
            let input = idle().with_action_down(InputAction::MoveRight, true);
            collected.extend(world.tick(TICK, &input).coins_collected);
        }
        assert_eq!(collected, vec![CoinKind::Gold]);
        assert!(world.coins.is_empty());
    }

    #[test]
    fn collected_coin_leaves_a_short_lived_particle() {
        let library = build_catalog().expect("catalog");
        let mut world = world_with_floor();
        let centre = world.player.visual_box.center();
        let id = world.ids.allocate();
        world.coins.push(Coin::new(
            id,
            CoinKind::Diamond,
            centre,
            library.get_or_placeholder("coin/diamond", Vec2::new(32.0, 32.0)),
        ));

        let report = world.tick(TICK, &idle());
        assert_eq!(report.coins_collected, vec![CoinKind::Diamond]);
        assert_eq!(world.particles.len(), 1);
        for _ in 0..60 {
            world.tick(TICK, &idle());
        }
        assert!(world.particles.is_empty());
    }

    #[test]
    fn spikes_hurt_once_per_invulnerability_window() {
        let library = build_catalog().expect("catalog");
        let mut world = world_with_floor();
        let id = world.ids.allocate();
        world
            .spikes
            .push(Spikes::new(id, Vec2::new(100.0, 0.0), &library));

        let first = world.tick(TICK, &idle());
        assert_eq!(first.hits_taken, 1);
        let second = world.tick(TICK, &idle());
        assert_eq!(second.hits_taken, 0);
        assert!(world.player.is_invulnerable());
    }

    #[test]
    fn pearl_hitting_the_player_is_consumed() {
        let mut world = world_with_floor();
        let spawn = PearlSpawn {
            muzzle: world.player.hitbox.center() - Vec2::new(45.0, 6.0),
            facing: Facing::Right,
        };
        let pearl = Pearl::new(world.ids.allocate(), spawn, &world.pearl_frames);
        world.pearls.push(pearl);

        let report = world.tick(TICK, &idle());
        assert_eq!(report.hits_taken, 1);
        assert!(world.pearls.is_empty());
    }

    #[test]
    fn pearls_break_on_terrain_but_pass_shells() {
        let library = build_catalog().expect("catalog");
        let mut world = world_with_floor();
        world.colliders.push(Collider {
            rect: Rect::new(900.0, -200.0, 64.0, 64.0),
            source: ColliderSource::Shell,
        });
        world.colliders.push(Collider {
            rect: Rect::new(1100.0, -200.0, 64.0, 64.0),
            source: ColliderSource::Terrain,
        });
        let spawn = PearlSpawn {
            muzzle: Vec2::new(800.0, -174.0),
            facing: Facing::Right,
        };
        let frames = library.get_or_placeholder("pearl", Vec2::ZERO);
        let pearl = Pearl::new(world.ids.allocate(), spawn, &frames);
        world.pearls.push(pearl);

        let mut ticks = 0;
        while !world.pearls.is_empty() && ticks < 600 {
            world.tick(TICK, &idle());
            ticks += 1;
        }
        assert!(world.pearls.is_empty());
        // 1100 - (845 + 8) = 247 px at 150 px/s.
        assert!(ticks > 90 && ticks < 110, "ticks = {ticks}");
    }

    #[test]
    fn fired_pearl_lives_its_full_lifetime() {
        let library = build_catalog().expect("catalog");
        let mut world = world_with_floor();
        let id = world.ids.allocate();
        let mut shell = Shell::new(id, Vec2::new(400.0, 0.0), Facing::Left, &library);
        shell.target = Some(world.player.id);
        world.shells.push(shell);
        // Outrun the pearl so it can only die of old age.
        let run_left = idle().with_action_down(InputAction::MoveLeft, true);

        let mut fired = None;
        for _ in 0..600 {
            if world.tick(TICK, &run_left).pearls_fired > 0 {
                fired = world.pearls.last().map(|pearl| pearl.id);
                break;
            }
        }
        let pearl = fired.expect("shell fired");
        let spawned_at = world
            .pearls
            .iter()
            .find(|candidate| candidate.id == pearl)
            .map(|candidate| candidate.visual_box)
            .expect("pearl");
        assert_eq!(spawned_at.center(), Vec2::new(395.0, 38.0));

        let mut alive = Duration::ZERO;
        while world.pearls.iter().any(|candidate| candidate.id == pearl) {
            world.tick(TICK, &run_left);
            alive += TICK;
            assert!(alive < Duration::from_secs(7), "pearl outlived its lifetime");
        }
        assert!(alive >= Duration::from_millis(6000), "alive = {alive:?}");
    }

    #[test]
    fn renderables_follow_the_camera() {
        let world = world_with_floor();
        let camera = Vec2::new(10.0, -20.0);
        let renderables = world.renderables(camera);
        let player = renderables.last().expect("player");
        assert_eq!(
            player.visual_box,
            world.player.visual_box.translated(Vec2::new(-10.0, 20.0))
        );
    }
}

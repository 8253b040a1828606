//! Lemming state machine
//!
//! `advance` is the single transition table: one exhaustive match over
//! `Action`, one function per state. Terrain edits are applied to the shared
//! terrain immediately so later lemmings in the same tick see them.

use glam::IVec2;

use super::event::GameEvent;
use super::lemming::{Action, Direction, Lemming};
use super::stencil::{Mask, Rect};
use crate::level::Terrain;
use crate::tuning::Tuning;

/// Shared world access for one lemming's transition
pub struct Ctx<'a> {
    pub terrain: &'a mut Terrain,
    pub tuning: &'a Tuning,
    pub events: &'a mut Vec<GameEvent>,
}

impl Ctx<'_> {
    #[inline]
    fn solid(&self, x: i32, y: i32) -> bool {
        self.terrain.stencil().is_solid(x, y)
    }

    #[inline]
    fn mask(&self, x: i32, y: i32) -> Mask {
        self.terrain.stencil().get(x, y)
    }

    #[inline]
    fn supported(&self, lem: &Lemming) -> bool {
        self.solid(lem.x, lem.y + 1)
    }

    /// Top row of the lemming's body
    #[inline]
    fn head(&self, lem: &Lemming) -> i32 {
        lem.y - self.tuning.lemming_height + 1
    }
}

/// Advance one lemming by one tick
pub fn advance(lem: &mut Lemming, ctx: &mut Ctx<'_>) {
    match lem.action {
        Action::Walking => walk(lem, ctx),
        Action::Falling { distance } => fall(lem, distance, ctx),
        Action::Floating => float(lem, ctx),
        Action::Climbing => climb(lem, ctx),
        Action::Hoisting { ticks } => hoist(lem, ticks, ctx),
        Action::Digging { ticks } => dig(lem, ticks, ctx),
        Action::Bashing { ticks } => bash(lem, ticks, ctx),
        Action::Mining { ticks } => mine(lem, ticks, ctx),
        Action::Building { ticks, bricks } => build(lem, ticks, bricks, ctx),
        Action::Shrugging { ticks } => shrug(lem, ticks, ctx),
        Action::Blocking => block(lem, ctx),
        Action::OhNo { ticks } => ohno(lem, ticks, ctx),
        Action::Splatting
        | Action::Drowning
        | Action::Exploding
        | Action::Trapped
        | Action::Burning
        | Action::FellOut
        | Action::Exited => {}
    }
}

/// Count down a lit fuse. At zero a grounded lemming says "oh no", an
/// airborne one explodes on the spot.
pub fn burn_fuse(lem: &mut Lemming, ctx: &mut Ctx<'_>) {
    let Some(fuse) = lem.fuse else { return };
    if lem.is_terminal() {
        return;
    }
    if fuse > 1 {
        lem.fuse = Some(fuse - 1);
        return;
    }
    lem.fuse = None;
    if matches!(lem.action, Action::Blocking) {
        clear_blocker(lem, ctx.terrain, ctx.tuning);
    }
    if lem.kind().is_airborne() {
        explode(lem, ctx);
    } else {
        lem.set_action(Action::OhNo { ticks: 0 });
        ctx.events.push(GameEvent::OhNo { id: lem.id });
    }
}

/// A blocker field in `mask` turns a lemming facing `dir` around
#[inline]
const fn pushes_against(mask: Mask, dir: Direction) -> bool {
    match dir {
        Direction::Right => mask.intersects(Mask::FORCE_LEFT),
        Direction::Left => mask.intersects(Mask::FORCE_RIGHT),
    }
}

/// Terrain a basher or miner travelling in `dir` cannot remove
#[inline]
const fn blocks_tunnel(mask: Mask, dir: Direction) -> bool {
    mask.intersects(Mask::STEEL)
        || match dir {
            Direction::Right => mask.intersects(Mask::ONE_WAY_LEFT),
            Direction::Left => mask.intersects(Mask::ONE_WAY_RIGHT),
        }
}

fn start_falling(lem: &mut Lemming) {
    lem.set_action(Action::Falling { distance: 0 });
}

fn walk(lem: &mut Lemming, ctx: &mut Ctx<'_>) {
    let nx = lem.x + lem.dir.sign();
    if pushes_against(ctx.mask(lem.x, lem.y), lem.dir)
        || pushes_against(ctx.mask(nx, lem.y), lem.dir)
        || nx < 0
        || nx >= ctx.terrain.width()
    {
        lem.turn_around();
        return;
    }

    if ctx.solid(nx, lem.y) {
        let step_up = ctx.tuning.step_up;
        let mut height = 0;
        while height <= step_up && ctx.solid(nx, lem.y - height) {
            height += 1;
        }
        if height <= step_up {
            lem.x = nx;
            lem.y -= height;
        } else if lem.climber {
            lem.set_action(Action::Climbing);
        } else {
            lem.turn_around();
        }
        return;
    }

    lem.x = nx;
    let step_down = ctx.tuning.step_down;
    let mut drop = 0;
    while drop <= step_down && !ctx.solid(nx, lem.y + 1 + drop) {
        drop += 1;
    }
    if drop > step_down {
        start_falling(lem);
    } else {
        lem.y += drop;
    }
}

/// Resolve a landing after `distance` pixels of free fall
fn land(lem: &mut Lemming, distance: i32, ctx: &mut Ctx<'_>) {
    if distance > ctx.tuning.max_fall_distance {
        lem.set_action(Action::Splatting);
        ctx.events.push(GameEvent::Splatted {
            id: lem.id,
            at: lem.pos(),
        });
    } else {
        lem.set_action(Action::Walking);
    }
}

/// Move one pixel down; false if the lemming left the level
fn drop_pixel(lem: &mut Lemming, ctx: &mut Ctx<'_>) -> bool {
    lem.y += 1;
    if lem.y >= ctx.terrain.height() {
        lem.set_action(Action::FellOut);
        ctx.events.push(GameEvent::FellOut { id: lem.id });
        return false;
    }
    true
}

fn fall(lem: &mut Lemming, mut distance: i32, ctx: &mut Ctx<'_>) {
    for _ in 0..ctx.tuning.fall_speed {
        if ctx.supported(lem) {
            land(lem, distance, ctx);
            return;
        }
        if !drop_pixel(lem, ctx) {
            return;
        }
        distance += 1;
        if lem.floater && distance >= ctx.tuning.floater_open_distance {
            lem.set_action(Action::Floating);
            return;
        }
    }
    if ctx.supported(lem) {
        land(lem, distance, ctx);
    } else {
        lem.action = Action::Falling { distance };
    }
}

fn float(lem: &mut Lemming, ctx: &mut Ctx<'_>) {
    for _ in 0..ctx.tuning.float_speed {
        if ctx.supported(lem) {
            lem.set_action(Action::Walking);
            return;
        }
        if !drop_pixel(lem, ctx) {
            return;
        }
    }
    if ctx.supported(lem) {
        lem.set_action(Action::Walking);
    }
}

fn climb(lem: &mut Lemming, ctx: &mut Ctx<'_>) {
    let head = ctx.head(lem);
    let wall_x = lem.x + lem.dir.sign();

    if !ctx.solid(wall_x, head) {
        lem.set_action(Action::Hoisting { ticks: 0 });
        return;
    }
    // Bonk: ceiling overhead or top of the level
    if head <= 0 || ctx.solid(lem.x, head - 1) {
        lem.turn_around();
        start_falling(lem);
        return;
    }
    lem.y -= ctx.tuning.climb_speed;
}

fn hoist(lem: &mut Lemming, ticks: u32, ctx: &mut Ctx<'_>) {
    let ticks = ticks + 1;
    if ticks < ctx.tuning.hoist_ticks {
        lem.action = Action::Hoisting { ticks };
        return;
    }
    let x = lem.x + lem.dir.sign();
    let lowest = ctx.head(lem);
    let mut y = lem.y;
    while y > lowest && ctx.solid(x, y) {
        y -= 1;
    }
    lem.x = x;
    lem.y = y;
    lem.set_action(Action::Walking);
}

fn dig(lem: &mut Lemming, ticks: u32, ctx: &mut Ctx<'_>) {
    let half = ctx.tuning.dig_half_width;
    let row = Rect::new(lem.x - half, lem.y + 1, 2 * half + 1, 1);
    let stencil = ctx.terrain.stencil();
    if !stencil.any_in(row, Mask::is_solid) {
        start_falling(lem);
        return;
    }

    if stencil.any_in(row, |m| m.intersects(Mask::STEEL)) {
        ctx.events.push(GameEvent::SteelHit { id: lem.id });
        lem.set_action(Action::Walking);
        return;
    }
    let ticks = ticks + 1;
    if ticks < ctx.tuning.dig_ticks {
        lem.action = Action::Digging { ticks };
        return;
    }
    for p in row.points() {
        ctx.terrain.carve(p.x, p.y);
    }
    lem.y += 1;
    lem.action = Action::Digging { ticks: 0 };
}

fn bash(lem: &mut Lemming, ticks: u32, ctx: &mut Ctx<'_>) {
    if !ctx.supported(lem) {
        start_falling(lem);
        return;
    }
    let ticks = ticks + 1;
    if ticks < ctx.tuning.bash_ticks {
        lem.action = Action::Bashing { ticks };
        return;
    }

    let dir = lem.dir.sign();
    let window = Rect::from_corners(
        IVec2::new(lem.x + dir, ctx.head(lem)),
        IVec2::new(lem.x + dir * ctx.tuning.bash_reach, lem.y),
    );
    let stencil = ctx.terrain.stencil();
    if stencil.any_in(window, |m| blocks_tunnel(m, lem.dir)) {
        ctx.events.push(GameEvent::SteelHit { id: lem.id });
        lem.set_action(Action::Walking);
        return;
    }
    if !stencil.any_in(window, Mask::is_solid) {
        lem.set_action(Action::Walking);
        return;
    }
    for p in window.points() {
        ctx.terrain.carve(p.x, p.y);
    }
    lem.x += dir;
    lem.action = Action::Bashing { ticks: 0 };
}

fn mine(lem: &mut Lemming, ticks: u32, ctx: &mut Ctx<'_>) {
    if !ctx.supported(lem) {
        start_falling(lem);
        return;
    }
    let ticks = ticks + 1;
    if ticks < ctx.tuning.mine_ticks {
        lem.action = Action::Mining { ticks };
        return;
    }

    let dir = lem.dir.sign();
    let stroke = Rect::from_corners(
        IVec2::new(lem.x + dir, ctx.head(lem) + 1),
        IVec2::new(lem.x + dir * ctx.tuning.mine_reach, lem.y + 1),
    );
    if ctx.terrain.stencil().any_in(stroke, |m| blocks_tunnel(m, lem.dir)) {
        ctx.events.push(GameEvent::SteelHit { id: lem.id });
        lem.set_action(Action::Walking);
        return;
    }
    for p in stroke.points() {
        ctx.terrain.carve(p.x, p.y);
    }
    // The lemming's own foot pixel goes too, so the slope stays walkable
    ctx.terrain.carve(lem.x, lem.y + 1);
    lem.x += dir * 2;
    lem.y += 1;
    lem.action = Action::Mining { ticks: 0 };
}

fn build(lem: &mut Lemming, ticks: u32, bricks: u32, ctx: &mut Ctx<'_>) {
    if !ctx.supported(lem) {
        start_falling(lem);
        return;
    }
    let ticks = ticks + 1;
    if ticks < ctx.tuning.brick_ticks {
        lem.action = Action::Building { ticks, bricks };
        return;
    }

    let dir = lem.dir.sign();
    for i in 1..=ctx.tuning.brick_width {
        ctx.terrain.lay_brick(lem.x + dir * i, lem.y);
    }
    let bricks = bricks + 1;
    let total = ctx.tuning.builder_bricks;
    if bricks + ctx.tuning.builder_warning_bricks > total {
        ctx.events.push(GameEvent::BuilderRunningOut { id: lem.id });
    }

    // Room to step up onto the new brick
    let next_y = lem.y - 1;
    let space = Rect::from_corners(
        IVec2::new(lem.x + dir, next_y - ctx.tuning.lemming_height + 1),
        IVec2::new(lem.x + dir * 2, next_y),
    );
    if ctx.terrain.stencil().any_in(space, Mask::is_solid) {
        lem.turn_around();
        lem.set_action(Action::Walking);
        return;
    }
    lem.x += dir * 2;
    lem.y = next_y;
    if bricks >= total {
        lem.set_action(Action::Shrugging { ticks: 0 });
    } else {
        lem.action = Action::Building { ticks: 0, bricks };
    }
}

fn shrug(lem: &mut Lemming, ticks: u32, ctx: &mut Ctx<'_>) {
    if !ctx.supported(lem) {
        start_falling(lem);
        return;
    }
    let ticks = ticks + 1;
    if ticks >= ctx.tuning.shrug_ticks {
        lem.set_action(Action::Walking);
    } else {
        lem.action = Action::Shrugging { ticks };
    }
}

fn block(lem: &mut Lemming, ctx: &mut Ctx<'_>) {
    if !ctx.supported(lem) {
        clear_blocker(lem, ctx.terrain, ctx.tuning);
        start_falling(lem);
    }
}

fn ohno(lem: &mut Lemming, ticks: u32, ctx: &mut Ctx<'_>) {
    for _ in 0..ctx.tuning.fall_speed {
        if ctx.supported(lem) {
            break;
        }
        if !drop_pixel(lem, ctx) {
            return;
        }
    }
    let ticks = ticks + 1;
    if ticks >= ctx.tuning.ohno_ticks {
        explode(lem, ctx);
    } else {
        lem.action = Action::OhNo { ticks };
    }
}

/// Carve the explosion disc and finish the lemming
fn explode(lem: &mut Lemming, ctx: &mut Ctx<'_>) {
    let r = ctx.tuning.explosion_radius;
    let center = IVec2::new(lem.x, lem.y - ctx.tuning.lemming_height / 3);
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                ctx.terrain.carve(center.x + dx, center.y + dy);
            }
        }
    }
    lem.set_action(Action::Exploding);
    ctx.events.push(GameEvent::Exploded {
        id: lem.id,
        at: lem.pos(),
    });
}

/// Area covered by a blocker standing where `lem` stands
pub fn blocker_field(lem: &Lemming, tuning: &Tuning) -> Rect {
    let reach = tuning.blocker_reach;
    Rect::new(
        lem.x - reach,
        lem.y - tuning.lemming_height + 1,
        2 * reach + 1,
        tuning.lemming_height,
    )
}

/// Write the force field of a new blocker into the stencil
pub fn stamp_blocker(lem: &Lemming, terrain: &mut Terrain, tuning: &Tuning) {
    let stencil = terrain.stencil_mut();
    for p in blocker_field(lem, tuning).points() {
        if p.x < lem.x {
            stencil.insert(p.x, p.y, Mask::FORCE_LEFT);
        } else if p.x > lem.x {
            stencil.insert(p.x, p.y, Mask::FORCE_RIGHT);
        }
    }
}

/// Remove a blocker's force field
pub fn clear_blocker(lem: &Lemming, terrain: &mut Terrain, tuning: &Tuning) {
    let stencil = terrain.stencil_mut();
    for p in blocker_field(lem, tuning).points() {
        stencil.remove(p.x, p.y, Mask::FORCE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::lemming::{ActionKind, LemmingId};
    use crate::sim::stencil::Material;

    const FLOOR: i32 = 40;

    fn floor() -> Terrain {
        let mut terrain = Terrain::new(120, 60);
        terrain.paint(Rect::new(0, FLOOR, 120, 20), Material::Brick);
        terrain
    }

    fn walker(x: i32) -> Lemming {
        let mut lem = Lemming::spawn(LemmingId(0), IVec2::new(x, FLOOR - 1));
        lem.set_action(Action::Walking);
        lem
    }

    fn run(lem: &mut Lemming, terrain: &mut Terrain, tuning: &Tuning, ticks: u32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            let mut ctx = Ctx {
                terrain: &mut *terrain,
                tuning,
                events: &mut events,
            };
            burn_fuse(lem, &mut ctx);
            advance(lem, &mut ctx);
        }
        events
    }

    #[test]
    fn test_walker_steps_up_small_obstacle() {
        let mut terrain = floor();
        terrain.paint(Rect::new(20, FLOOR - 4, 10, 4), Material::Brick);
        let tuning = Tuning::default();
        let mut lem = walker(18);
        run(&mut lem, &mut terrain, &tuning, 2);
        assert_eq!(lem.x, 20);
        assert_eq!(lem.y, FLOOR - 5);
        assert_eq!(lem.kind(), ActionKind::Walking);
    }

    #[test]
    fn test_walker_turns_at_tall_wall() {
        let mut terrain = floor();
        terrain.paint(Rect::new(20, FLOOR - 20, 4, 20), Material::Brick);
        let tuning = Tuning::default();
        let mut lem = walker(19);
        run(&mut lem, &mut terrain, &tuning, 1);
        assert_eq!(lem.dir, Direction::Left);
        assert_eq!(lem.x, 19);
    }

    #[test]
    fn test_walker_steps_down_and_falls() {
        let mut terrain = floor();
        // 2px ledge drop, then a pit
        terrain.carve(21, FLOOR);
        terrain.carve(21, FLOOR + 1);
        terrain.paint(Rect::new(22, FLOOR, 20, 20), Material::Empty);
        let tuning = Tuning::default();
        let mut lem = walker(20);
        run(&mut lem, &mut terrain, &tuning, 1);
        assert_eq!((lem.x, lem.y), (21, FLOOR + 1));
        run(&mut lem, &mut terrain, &tuning, 1);
        assert_eq!(lem.kind(), ActionKind::Falling);
    }

    #[test]
    fn test_climber_reaches_top_and_walks_on() {
        let mut terrain = floor();
        terrain.paint(Rect::new(30, FLOOR - 20, 30, 20), Material::Brick);
        let tuning = Tuning::default();
        let mut lem = walker(29);
        lem.climber = true;
        run(&mut lem, &mut terrain, &tuning, 1);
        assert_eq!(lem.kind(), ActionKind::Climbing);
        // 11 pixels up, one tick to grab the ledge, then the hoist itself
        run(&mut lem, &mut terrain, &tuning, 12 + tuning.hoist_ticks);
        assert_eq!(lem.kind(), ActionKind::Walking);
        assert_eq!((lem.x, lem.y), (30, FLOOR - 21));
    }

    #[test]
    fn test_climber_bonks_on_overhang() {
        let mut terrain = floor();
        terrain.paint(Rect::new(30, FLOOR - 30, 10, 30), Material::Brick);
        // Overhang above the climbing column
        terrain.paint(Rect::new(25, FLOOR - 16, 5, 2), Material::Brick);
        let tuning = Tuning::default();
        let mut lem = walker(29);
        lem.climber = true;
        run(&mut lem, &mut terrain, &tuning, 1);
        let mut bonked = false;
        for _ in 0..40 {
            run(&mut lem, &mut terrain, &tuning, 1);
            if lem.kind() == ActionKind::Falling {
                bonked = true;
                break;
            }
        }
        assert!(bonked);
        assert_eq!(lem.dir, Direction::Left);
        run(&mut lem, &mut terrain, &tuning, 10);
        assert_eq!(lem.kind(), ActionKind::Walking);
        assert_eq!(lem.dir, Direction::Left);
    }

    #[test]
    fn test_fatal_fall_splats() {
        let mut terrain = Terrain::new(40, 200);
        terrain.paint(Rect::new(0, 150, 40, 10), Material::Brick);
        let tuning = Tuning::default();
        let mut lem = Lemming::spawn(LemmingId(0), IVec2::new(10, 20));
        let events = run(&mut lem, &mut terrain, &tuning, 60);
        assert_eq!(lem.kind(), ActionKind::Splatting);
        assert_eq!(lem.y, 149);
        assert!(events.iter().any(|e| matches!(e, GameEvent::Splatted { .. })));
    }

    #[test]
    fn test_floater_survives_long_fall() {
        let mut terrain = Terrain::new(40, 200);
        terrain.paint(Rect::new(0, 150, 40, 10), Material::Brick);
        let tuning = Tuning::default();
        let mut lem = Lemming::spawn(LemmingId(0), IVec2::new(10, 20));
        lem.floater = true;
        run(&mut lem, &mut terrain, &tuning, 100);
        assert_eq!(lem.kind(), ActionKind::Walking);
    }

    #[test]
    fn test_digger_never_carves_above_start_and_stops_at_steel() {
        let mut terrain = floor();
        terrain.paint(Rect::new(0, FLOOR + 10, 120, 2), Material::Steel);
        let before = terrain.clone();
        let tuning = Tuning::default();
        let mut lem = walker(50);
        lem.set_action(Action::Digging { ticks: 0 });
        let start_row = lem.y + 1;
        let events = run(&mut lem, &mut terrain, &tuning, 80);
        assert_eq!(lem.kind(), ActionKind::Walking);
        assert_eq!(lem.y, FLOOR + 9);
        assert!(events.iter().any(|e| matches!(e, GameEvent::SteelHit { .. })));
        // Nothing above the starting row changed, steel untouched
        for y in 0..start_row {
            for x in 0..120 {
                assert_eq!(terrain.stencil().get(x, y), before.stencil().get(x, y));
            }
        }
        assert_eq!(terrain.stencil().material(50, FLOOR + 10), Material::Steel);
    }

    #[test]
    fn test_digger_on_steel_stops_at_once() {
        let mut terrain = floor();
        terrain.paint(Rect::new(40, FLOOR, 20, 2), Material::Steel);
        let tuning = Tuning::default();
        let mut lem = walker(50);
        lem.set_action(Action::Digging { ticks: 0 });
        let events = run(&mut lem, &mut terrain, &tuning, 1);
        assert_eq!(lem.kind(), ActionKind::Walking);
        assert_eq!(events, vec![GameEvent::SteelHit { id: lem.id }]);
    }

    #[test]
    fn test_basher_tunnels_through_wall() {
        let mut terrain = floor();
        terrain.paint(Rect::new(30, FLOOR - 15, 8, 15), Material::Brick);
        let tuning = Tuning::default();
        let mut lem = walker(28);
        lem.set_action(Action::Bashing { ticks: 0 });
        run(&mut lem, &mut terrain, &tuning, 60);
        assert_eq!(lem.kind(), ActionKind::Walking);
        // Tunnel through the body band, roof above it intact
        for x in 30..38 {
            assert!(!terrain.stencil().is_solid(x, FLOOR - 1));
            assert!(terrain.stencil().is_solid(x, FLOOR - 11));
        }
    }

    #[test]
    fn test_basher_stopped_by_one_way_wall() {
        let mut terrain = floor();
        terrain.paint(Rect::new(30, FLOOR - 15, 8, 15), Material::Brick);
        terrain.tag_one_way(Rect::new(30, FLOOR - 15, 8, 15), Mask::ONE_WAY_LEFT);
        let tuning = Tuning::default();
        let mut lem = walker(28);
        lem.set_action(Action::Bashing { ticks: 0 });
        let events = run(&mut lem, &mut terrain, &tuning, 4);
        assert!(events.iter().any(|e| matches!(e, GameEvent::SteelHit { .. })));
        assert!(terrain.stencil().is_solid(30, FLOOR - 1));
    }

    #[test]
    fn test_miner_descends_diagonally() {
        let mut terrain = floor();
        let tuning = Tuning::default();
        let mut lem = walker(20);
        lem.set_action(Action::Mining { ticks: 0 });
        run(&mut lem, &mut terrain, &tuning, tuning.mine_ticks * 3);
        assert_eq!(lem.kind(), ActionKind::Mining);
        assert_eq!((lem.x, lem.y), (26, FLOOR + 2));
        assert!(!terrain.stencil().is_solid(lem.x, lem.y));
        assert!(terrain.stencil().is_solid(lem.x, lem.y + 1));
    }

    #[test]
    fn test_builder_stops_at_ceiling() {
        let mut terrain = floor();
        terrain.paint(Rect::new(0, FLOOR - 13, 120, 2), Material::Brick);
        let tuning = Tuning::default();
        let mut lem = walker(20);
        lem.set_action(Action::Building { ticks: 0, bricks: 0 });
        run(&mut lem, &mut terrain, &tuning, tuning.brick_ticks * 2);
        assert_eq!(lem.kind(), ActionKind::Walking);
        assert_eq!(lem.dir, Direction::Left);
    }

    #[test]
    fn test_builder_warning_never_underflows() {
        let mut terrain = floor();
        // Hand-built table that bypasses validation
        let tuning = Tuning {
            builder_bricks: 0,
            ..Tuning::default()
        };
        let mut lem = walker(20);
        lem.set_action(Action::Building { ticks: 0, bricks: 0 });
        let events = run(&mut lem, &mut terrain, &tuning, tuning.brick_ticks);
        assert_eq!(lem.kind(), ActionKind::Shrugging);
        assert!(events.iter().any(|e| matches!(e, GameEvent::BuilderRunningOut { .. })));
    }

    #[test]
    fn test_blocker_turns_walkers() {
        let mut terrain = floor();
        let tuning = Tuning::default();
        let blocker = walker(40);
        stamp_blocker(&blocker, &mut terrain, &tuning);
        let mut lem = walker(30);
        run(&mut lem, &mut terrain, &tuning, 6);
        assert_eq!(lem.dir, Direction::Left);
        assert!(lem.x < 34);
        clear_blocker(&blocker, &mut terrain, &tuning);
        assert!(!terrain.stencil().any_in(blocker_field(&blocker, &tuning), |m| m.intersects(Mask::FORCE)));
    }

    #[test]
    fn test_bomber_ohno_then_explodes() {
        let mut terrain = floor();
        let tuning = Tuning::default();
        let mut lem = walker(50);
        lem.set_action(Action::Blocking);
        lem.fuse = Some(3);
        let events = run(&mut lem, &mut terrain, &tuning, 3);
        assert_eq!(lem.kind(), ActionKind::OhNo);
        assert!(events.iter().any(|e| matches!(e, GameEvent::OhNo { .. })));
        let events = run(&mut lem, &mut terrain, &tuning, tuning.ohno_ticks);
        assert_eq!(lem.kind(), ActionKind::Exploding);
        assert!(events.iter().any(|e| matches!(e, GameEvent::Exploded { .. })));
        assert!(!terrain.stencil().is_solid(50, FLOOR));
        assert!(terrain.stencil().is_solid(50, FLOOR + 6));
    }

    #[test]
    fn test_airborne_bomber_explodes_immediately() {
        let mut terrain = floor();
        let tuning = Tuning::default();
        let mut lem = Lemming::spawn(LemmingId(0), IVec2::new(10, 5));
        lem.fuse = Some(1);
        run(&mut lem, &mut terrain, &tuning, 1);
        assert_eq!(lem.kind(), ActionKind::Exploding);
    }
}

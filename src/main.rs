use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEventKind,
};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use mutated_maze::charge::{cursor_footprint, Charge, CURSOR_SIZE, MAX_CHARGE};
use mutated_maze::config::Settings;
use mutated_maze::fog::{Fog, FogEvent};
use mutated_maze::follow::{EntityId, FollowChain};
use mutated_maze::mutation::{cursor_mutation, fog_mutation, Palette, Relocatable};
use mutated_maze::{
    ColorTag, Dir, Grid, PixelMaskSelector, Pos, Rect, RegionSelector, CELL_SIZE,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::io::{self, Stdout, Write};
use std::thread;
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

const CELL_W: usize = 2;
const INIT_DISTANCE_FROM_PLAYER: f64 = 5.0;
const PLAYER_SPEED: i32 = 2;
const MOB_SPEED: i32 = 1;
const ENEMY_CHANCE: f64 = 1.0 / 3.0;
const BASE_COLOR: Color = Color::Green;
const MAZE_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Blue,
    Color::Red,
    Color::White,
];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Kind {
    Friendly,
    Enemy,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum MobState {
    Idle,
    Wait(u32),
    Wander(Dir),
}

struct Mob {
    id: EntityId,
    x: i32,
    y: i32,
    kind: Kind,
    state: MobState,
    alive: bool,
}

impl Mob {
    fn hitbox(&self) -> Rect {
        Rect::new(self.x + 4, self.y + 3, 8, 10)
    }

    fn update(&mut self, grid: &Grid, chain: &mut FollowChain, rng: &mut impl Rng) {
        if !self.alive {
            return;
        }
        if chain.registry.is_following(self.id) {
            (self.x, self.y) = chain.follower_pos(self.id);
            return;
        }
        match self.state {
            MobState::Idle => {
                self.state = if rng.gen_bool(0.5) {
                    MobState::Wait(rng.gen_range(3..9))
                } else {
                    self.pick_dir(grid, rng)
                };
            }
            MobState::Wait(n) => {
                self.state = if n <= 1 {
                    MobState::Idle
                } else {
                    MobState::Wait(n - 1)
                };
            }
            MobState::Wander(dir) => {
                let (dx, dy) = dir.delta();
                self.x += dx as i32 * MOB_SPEED;
                self.y += dy as i32 * MOB_SPEED;
                if self.x % CELL_SIZE == 0 && self.y % CELL_SIZE == 0 {
                    self.state = MobState::Idle;
                }
            }
        }
    }

    fn pick_dir(&self, grid: &Grid, rng: &mut impl Rng) -> MobState {
        grid.cell_at(self.x, self.y)
            .and_then(|pos| grid.open_dirs(pos).choose(rng).copied())
            .map(MobState::Wander)
            .unwrap_or(MobState::Idle)
    }
}

impl Relocatable for Mob {
    fn id(&self) -> EntityId {
        self.id
    }

    fn pixel_pos(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn relocate(&mut self, origin: (i32, i32)) {
        (self.x, self.y) = origin;
        self.state = MobState::Idle;
    }

    fn toggle_kind(&mut self) {
        self.kind = match self.kind {
            Kind::Friendly => Kind::Enemy,
            Kind::Enemy => Kind::Friendly,
        };
    }
}

struct Player {
    x: i32,
    y: i32,
    dir: Option<Dir>,
    wanted: Option<Dir>,
    alive: bool,
}

impl Player {
    fn hitbox(&self) -> Rect {
        Rect::new(self.x + 4, self.y + 3, 8, 10)
    }

    fn update(&mut self, grid: &Grid) {
        if let (Some(dir), Some(wanted)) = (self.dir, self.wanted) {
            if wanted == dir.opposite() {
                self.dir = Some(wanted);
            }
        }

        let here = grid.cell_at(self.x, self.y);
        if self.x % CELL_SIZE == 0 && self.y % CELL_SIZE == 0 {
            if let (Some(wanted), Some(pos)) = (self.wanted, here) {
                if grid.is_open(pos, wanted) {
                    self.dir = Some(wanted);
                }
            }
        }

        let Some(dir) = self.dir else {
            return;
        };
        let at_edge = match dir {
            Dir::Up | Dir::Down => self.y % CELL_SIZE == 0,
            Dir::Left | Dir::Right => self.x % CELL_SIZE == 0,
        };
        if at_edge && here.map_or(true, |pos| !grid.is_open(pos, dir)) {
            return;
        }
        let (dx, dy) = dir.delta();
        self.x += dx as i32 * PLAYER_SPEED;
        self.y += dy as i32 * PLAYER_SPEED;
    }
}

struct Game {
    settings: Settings,
    grid: Grid,
    palette: Palette,
    fog: Fog,
    charge: Charge,
    player: Player,
    chain: FollowChain,
    mobs: Vec<Mob>,
    cursor: (i32, i32),
    level: u32,
    deaths: u32,
    mutations: u32,
}

impl Game {
    fn handle_collisions(&mut self) {
        let hitbox = self.player.hitbox();
        for idx in 0..self.mobs.len() {
            let mob = &self.mobs[idx];
            if !mob.alive || !hitbox.collides(&mob.hitbox()) {
                continue;
            }
            let (id, kind) = (mob.id, mob.kind);
            match kind {
                Kind::Friendly => {
                    if self.chain.registry.follow(id) {
                        log::debug!("{:?} joined the chain", id);
                    }
                }
                Kind::Enemy => {
                    self.on_enemy_hit(idx);
                    if !self.player.alive {
                        return;
                    }
                }
            }
        }
    }

    // A follower takes the hit first, and the enemy goes down with it.
    fn on_enemy_hit(&mut self, killer: usize) {
        let victim = self.chain.registry.followers().next();
        match victim {
            Some(id) => {
                self.chain.registry.unfollow(id);
                if let Some(mob) = self.mobs.iter_mut().find(|m| m.id == id) {
                    mob.alive = false;
                }
                self.mobs[killer].alive = false;
            }
            None => self.player.alive = false,
        }
    }

    fn update_fog(&mut self, rng: &mut impl Rng) {
        if self.fog.update() == FogEvent::Mutate {
            let report = fog_mutation(
                &mut self.grid,
                &self.fog.selector(),
                &mut self.palette,
                &mut self.mobs,
                &mut self.chain.registry,
                rng,
            );
            if !report.cells.is_empty() {
                self.mutations += 1;
            }
        }
        if self.fog.passed() {
            self.fog = Fog::new(&self.grid, rng);
        }
    }

    fn mutate_at_cursor(&mut self, rng: &mut impl Rng) {
        if !self.charge.try_spend() {
            return;
        }
        let footprint = cursor_footprint(self.cursor.0, self.cursor.1);
        let report = cursor_mutation(&mut self.grid, footprint, &mut self.palette, rng);
        if !report.cells.is_empty() {
            self.mutations += 1;
        }
    }

    fn move_cursor(&mut self, dx: i32, dy: i32) {
        let (x, y) = self.cursor;
        self.cursor = (
            (x + dx * CELL_SIZE).clamp(CELL_SIZE - CURSOR_SIZE, self.grid.px_width() - CELL_SIZE),
            (y + dy * CELL_SIZE).clamp(CELL_SIZE - CURSOR_SIZE, self.grid.px_height() - CELL_SIZE),
        );
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Friend,
    Enemy,
    Wall,
    Fog,
    Cursor,
    Empty,
}

#[derive(Clone, Copy, PartialEq)]
struct Paint {
    glyph: Glyph,
    color: Color,
}

/// Terminal layout: each maze cell is a floor tile surrounded by wall tiles,
/// so a `w x h` maze occupies `(2w+1) x (2h+1)` tiles of `CELL_W` columns.
struct Renderer {
    last: Vec<Paint>,
    last_hud: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
    tiles_w: usize,
    tiles_h: usize,
}

impl Renderer {
    fn new(width: usize, height: usize) -> Self {
        let tiles_w = width * 2 + 1;
        let tiles_h = height * 2 + 1;
        Self {
            last: vec![
                Paint {
                    glyph: Glyph::Empty,
                    color: Color::Reset,
                };
                tiles_w * tiles_h
            ],
            last_hud: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
            tiles_w,
            tiles_h,
        }
    }

    /// Maze pixel under a terminal column/row.
    fn screen_to_maze(&self, column: u16, row: u16) -> (i32, i32) {
        let tx = (column as i32 - self.origin_x as i32) / CELL_W as i32;
        let ty = row as i32 - self.origin_y as i32;
        ((tx - 1) * CELL_SIZE / 2, (ty - 1) * CELL_SIZE / 2)
    }
}

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableMouseCapture)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout);

    stdout.execute(Show)?;
    stdout.execute(DisableMouseCapture)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn run(stdout: &mut Stdout) -> io::Result<()> {
    let settings = Settings::from_env();
    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut game = new_game(settings, &mut rng, 1)?;
    let mut renderer = Renderer::new(settings.width, settings.height);
    let mut last_tick = Instant::now();
    let frame_time = Duration::from_micros(1_000_000 / settings.render_fps.max(1));

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key) => match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => match key.code {
                        KeyCode::Char('q') => return Ok(()),
                        KeyCode::Char('k') | KeyCode::Up => game.player.wanted = Some(Dir::Up),
                        KeyCode::Char('j') | KeyCode::Down => {
                            game.player.wanted = Some(Dir::Down)
                        }
                        KeyCode::Char('h') | KeyCode::Left => {
                            game.player.wanted = Some(Dir::Left)
                        }
                        KeyCode::Char('l') | KeyCode::Right => {
                            game.player.wanted = Some(Dir::Right)
                        }
                        KeyCode::Char('w') => game.move_cursor(0, -1),
                        KeyCode::Char('s') => game.move_cursor(0, 1),
                        KeyCode::Char('a') => game.move_cursor(-1, 0),
                        KeyCode::Char('d') => game.move_cursor(1, 0),
                        KeyCode::Char(' ') => game.mutate_at_cursor(&mut rng),
                        KeyCode::Char('n') => {
                            game = new_game(settings, &mut rng, game.level + 1)?;
                            renderer.needs_full = true;
                        }
                        _ => {}
                    },
                    _ => {}
                },
                Event::Mouse(mouse) => {
                    game.cursor = renderer.screen_to_maze(mouse.column, mouse.row);
                    if mouse.kind == MouseEventKind::Down(MouseButton::Left) {
                        game.mutate_at_cursor(&mut rng);
                    }
                }
                Event::Resize(_, _) => renderer.needs_full = true,
                _ => {}
            }
        }

        if last_tick.elapsed() >= Duration::from_millis(settings.tick_ms) {
            last_tick = Instant::now();
            tick(&mut game, &mut rng)?;
        }
        render(stdout, &game, &mut renderer)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn new_game(settings: Settings, rng: &mut impl Rng, level: u32) -> io::Result<Game> {
    let grid = Grid::generated(settings.width, settings.height, rng)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let start = Pos::new(0, 0);
    let mut spawns: Vec<Pos> = grid
        .positions()
        .filter(|p| p.distance_to(start) > INIT_DISTANCE_FROM_PLAYER)
        .collect();
    spawns.shuffle(rng);

    let mut mobs = Vec::new();
    for (i, pos) in spawns.into_iter().take(settings.mobs).enumerate() {
        let (x, y) = pos.pixel_origin();
        let kind = if rng.gen_bool(ENEMY_CHANCE) {
            Kind::Enemy
        } else {
            Kind::Friendly
        };
        mobs.push(Mob {
            id: EntityId(i as u32),
            x,
            y,
            kind,
            state: MobState::Idle,
            alive: true,
        });
    }

    let (px, py) = start.pixel_origin();
    let fog = Fog::new(&grid, rng);
    let palette = Palette::shuffled(MAZE_COLORS.len() as u8, rng);
    log::info!("level {} with {} mobs", level, mobs.len());
    Ok(Game {
        settings,
        palette,
        fog,
        charge: Charge::new(settings.charge_infinite),
        player: Player {
            x: px,
            y: py,
            dir: None,
            wanted: None,
            alive: true,
        },
        chain: FollowChain::new((px, py)),
        mobs,
        cursor: (grid.px_width() / 2, grid.px_height() / 2),
        grid,
        level,
        deaths: 0,
        mutations: 0,
    })
}

fn tick(game: &mut Game, rng: &mut impl Rng) -> io::Result<()> {
    game.player.update(&game.grid);
    game.chain.trail.record((game.player.x, game.player.y));
    for mob in game.mobs.iter_mut() {
        mob.update(&game.grid, &mut game.chain, rng);
    }
    game.handle_collisions();

    if !game.player.alive {
        let deaths = game.deaths + 1;
        *game = new_game(game.settings, rng, game.level)?;
        game.deaths = deaths;
        return Ok(());
    }

    game.update_fog(rng);
    game.charge.tick();
    Ok(())
}

fn render(stdout: &mut Stdout, game: &Game, renderer: &mut Renderer) -> io::Result<()> {
    let needed_h = (renderer.tiles_h + 2) as u16;
    let needed_w = (renderer.tiles_w * CELL_W) as u16;

    stdout.queue(MoveTo(0, 0))?;

    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        );
        stdout.queue(Print(msg))?;
        stdout.flush()?;
        renderer.needs_full = true;
        return Ok(());
    }

    let origin_x = (term_w - needed_w) / 2;
    let origin_y = (term_h - needed_h) / 2 + 1;
    if origin_x != renderer.origin_x || origin_y != renderer.origin_y {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
    }
    if renderer.needs_full {
        stdout.queue(Clear(ClearType::All))?;
    }

    let hud = format!(
        "Level: {}  Charge: {:>3}%  Chain: {}  Mutations: {}  Deaths: {}  (hjkl move, wasd/mouse aim, space mutate, n new, q quit)",
        game.level,
        game.charge.level() * 100 / MAX_CHARGE,
        game.chain.registry.len(),
        game.mutations,
        game.deaths
    );
    if renderer.needs_full || hud != renderer.last_hud {
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y - 1))?;
        stdout.queue(SetForegroundColor(Color::White))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(Print(&hud))?;
        stdout.queue(ResetColor)?;
        renderer.last_hud = hud;
    }

    let fog = PixelMaskSelector::new(game.fog.shown(), game.fog.offset());
    let footprint = cursor_footprint(game.cursor.0, game.cursor.1);
    for ty in 0..renderer.tiles_h {
        for tx in 0..renderer.tiles_w {
            let paint = paint_for(game, &fog, &footprint, tx, ty);
            let idx = ty * renderer.tiles_w + tx;
            if renderer.needs_full || paint != renderer.last[idx] {
                renderer.last[idx] = paint;
                draw_tile(stdout, renderer, tx, ty, paint)?;
            }
        }
    }
    renderer.needs_full = false;

    stdout.flush()?;
    Ok(())
}

fn tag_color(tag: ColorTag) -> Color {
    match tag.0 {
        0 => BASE_COLOR,
        n => MAZE_COLORS[(n as usize - 1) % MAZE_COLORS.len()],
    }
}

fn wall(color: ColorTag) -> Paint {
    Paint {
        glyph: Glyph::Wall,
        color: tag_color(color),
    }
}

const EMPTY: Paint = Paint {
    glyph: Glyph::Empty,
    color: Color::Reset,
};

fn paint_for(game: &Game, fog: &PixelMaskSelector<'_>, footprint: &Rect, tx: usize, ty: usize) -> Paint {
    let grid = &game.grid;
    let (w, h) = (grid.width(), grid.height());
    match (tx % 2, ty % 2) {
        // Post between four cells.
        (0, 0) => wall(grid.color(Pos::new((tx / 2).min(w - 1), (ty / 2).min(h - 1)))),
        // Wall west of cell (tx/2, ty/2).
        (0, 1) => {
            let (x, y) = (tx / 2, ty / 2);
            let pos = Pos::new(x.min(w - 1), y);
            let closed = x == 0 || x == w || !grid.is_open(pos, Dir::Left);
            if closed {
                wall(grid.color(pos))
            } else {
                EMPTY
            }
        }
        // Wall north of cell (tx/2, ty/2).
        (1, 0) => {
            let (x, y) = (tx / 2, ty / 2);
            let pos = Pos::new(x, y.min(h - 1));
            let closed = y == 0 || y == h || !grid.is_open(pos, Dir::Up);
            if closed {
                wall(grid.color(pos))
            } else {
                EMPTY
            }
        }
        _ => floor_paint(game, fog, footprint, Pos::new(tx / 2, ty / 2)),
    }
}

fn floor_paint(game: &Game, fog: &PixelMaskSelector<'_>, footprint: &Rect, pos: Pos) -> Paint {
    let occupies = |x: i32, y: i32| {
        game.grid.cell_at(x + CELL_SIZE / 2, y + CELL_SIZE / 2) == Some(pos)
    };
    if game.player.alive && occupies(game.player.x, game.player.y) {
        return Paint {
            glyph: Glyph::Player,
            color: Color::Yellow,
        };
    }
    if let Some(mob) = game.mobs.iter().find(|m| m.alive && occupies(m.x, m.y)) {
        return match mob.kind {
            Kind::Friendly => Paint {
                glyph: Glyph::Friend,
                color: if game.chain.registry.is_following(mob.id) {
                    Color::Cyan
                } else {
                    Color::White
                },
            },
            Kind::Enemy => Paint {
                glyph: Glyph::Enemy,
                color: Color::Red,
            },
        };
    }
    if footprint.collides(&pos.hitbox()) {
        return Paint {
            glyph: Glyph::Cursor,
            color: if game.charge.is_full() {
                Color::Yellow
            } else {
                Color::DarkGrey
            },
        };
    }
    if fog.covers(pos) {
        return Paint {
            glyph: Glyph::Fog,
            color: Color::DarkGrey,
        };
    }
    EMPTY
}

fn draw_tile(stdout: &mut Stdout, renderer: &Renderer, x: usize, y: usize, paint: Paint) -> io::Result<()> {
    let (text, color) = match paint.glyph {
        Glyph::Player => ("😃", paint.color),
        Glyph::Friend => ("☺", paint.color),
        Glyph::Enemy => ("👻", paint.color),
        Glyph::Wall => ("██", paint.color),
        Glyph::Fog => ("░░", paint.color),
        Glyph::Cursor => ("··", paint.color),
        Glyph::Empty => ("  ", paint.color),
    };
    let x_pos = renderer.origin_x + (x * CELL_W) as u16;
    let y_pos = renderer.origin_y + y as u16;
    stdout.queue(MoveTo(x_pos, y_pos))?;
    stdout.queue(SetForegroundColor(color))?;
    stdout.queue(Print(text))?;
    let w = UnicodeWidthStr::width(text);
    if w < CELL_W {
        for _ in 0..(CELL_W - w) {
            stdout.queue(Print(' '))?;
        }
    }
    stdout.queue(ResetColor)?;
    Ok(())
}

use anyhow::Context;
use mine_inference::{Grid, InferenceConfig, Point, Reasoner};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use tracing_subscriber::EnvFilter;

/// Board settings, from `mine-inference [width] [height] [mines] [seed]`.
#[derive(Debug, Clone, Copy)]
struct DemoConfig {
    width: usize,
    height: usize,
    mines: usize,
    seed: u64,
}

impl DemoConfig {
    fn from_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut next = |name: &str, default: usize| -> anyhow::Result<usize> {
            match args.next() {
                Some(arg) => arg.parse().with_context(|| format!("invalid {name}: {arg}")),
                None => Ok(default),
            }
        };
        let width = next("width", 8)?;
        let height = next("height", 8)?;
        let mines = next("mines", 8)?;
        let seed: u64 = match args.next() {
            Some(arg) => arg.parse().with_context(|| format!("invalid seed: {arg}"))?,
            None => rand::rng().random(),
        };

        if width == 0 || height == 0 {
            anyhow::bail!("board must have at least one cell");
        }
        if mines >= width * height {
            anyhow::bail!("mines must be fewer than the {} cells", width * height);
        }
        Ok(DemoConfig {
            width,
            height,
            mines,
            seed,
        })
    }
}

/// The hidden ground truth the reasoner is asked about.
struct Minefield {
    grid: Grid,
    mines: HashSet<Point>,
}

impl Minefield {
    /// Places mines anywhere except `opening`.
    fn random(grid: Grid, mines: usize, opening: Point, rng: &mut impl Rng) -> Self {
        let candidates: Vec<Point> = grid.points().filter(|p| *p != opening).collect();
        let mines = rand::seq::index::sample(rng, candidates.len(), mines)
            .into_iter()
            .map(|i| candidates[i])
            .collect();
        Minefield { grid, mines }
    }

    fn adjacent_mines(&self, point: Point) -> u32 {
        self.grid
            .neighbors(point)
            .filter(|n| self.mines.contains(n))
            .count() as u32
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = DemoConfig::from_args(std::env::args().skip(1))?;
    tracing::info!(?config, "starting");

    let grid = Grid::new(config.width, config.height);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let opening = Point::new(
        rng.random_range(0..config.width),
        rng.random_range(0..config.height),
    );
    let field = Minefield::random(grid, config.mines, opening, &mut rng);

    let mut reasoner = Reasoner::new(InferenceConfig::default());
    let mut next = Some(opening);
    let mut move_count = 0;

    while let Some(point) = next {
        move_count += 1;
        let count = field.adjacent_mines(point);
        let report = reasoner
            .observe(point, count, |p| grid.neighbors(*p))
            .with_context(|| format!("observing ({}, {}) = {count}", point.x, point.y))?;
        tracing::info!(
            move_count,
            x = point.x,
            y = point.y,
            count,
            classified = report.classified,
            derived = report.derived,
            "revealed"
        );
        next = reasoner.safe_moves().into_iter().next();
    }

    print_board(&field, &reasoner);

    let knowledge = reasoner.knowledge();
    if reasoner.all_mines_found(config.mines) {
        tracing::info!(moves = move_count, "every mine deduced");
    } else {
        tracing::info!(
            moves = move_count,
            mines_found = knowledge.known_mines().len(),
            mines = config.mines,
            open_sentences = knowledge.sentences().len(),
            "no safe move left without guessing"
        );
    }
    Ok(())
}

fn print_board(field: &Minefield, reasoner: &Reasoner<Point>) {
    let knowledge = reasoner.knowledge();

    print!("   ");
    for x in 0..field.grid.width {
        print!("{:^3}", x);
    }
    println!("\n  +{}", "---".repeat(field.grid.width));

    for y in 0..field.grid.height {
        print!("{:^2}|", y);
        for x in 0..field.grid.width {
            let point = Point::new(x, y);
            let display = if knowledge.moves_made().contains(&point) {
                format!(" {} ", field.adjacent_mines(point))
            } else if reasoner.is_known_mine(&point) {
                " * ".to_string()
            } else if reasoner.is_known_safe(&point) {
                " . ".to_string()
            } else {
                " ■ ".to_string()
            };
            print!("{}", display);
        }
        println!();
    }
    println!();
}

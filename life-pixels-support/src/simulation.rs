use life_grid::{bounding_box, Coord, GridError, LifeGrid, Random};
use log::{debug, info};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_DELAY_MILLIS: i64 = 100;
pub const SOUP_DENSITY: f64 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Cells can be painted; the engine holds nothing yet.
    Editing,
    Running,
    Paused,
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("delay must be at least 1 ms, got {0}")]
    InvalidDelay(i64),
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Owns one grid engine and decides when it is initialized, stepped and cleared.
#[derive(Debug)]
pub struct Simulation {
    grid: LifeGrid,
    pattern: HashSet<Coord>,
    mode: Mode,
    delay: Duration,
    rand: Random,
}

impl Simulation {
    pub fn new(rand: Random) -> Self {
        Self {
            grid: LifeGrid::new(),
            pattern: HashSet::new(),
            mode: Mode::Editing,
            delay: Duration::from_millis(DEFAULT_DELAY_MILLIS as u64),
            rand,
        }
    }

    pub fn with_pattern<I>(mut self, pattern: I) -> Self
    where
        I: IntoIterator<Item = Coord>,
    {
        self.pattern.extend(pattern);
        self
    }

    pub fn grid(&self) -> &LifeGrid {
        &self.grid
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Rejects non-positive delays and keeps the current one.
    pub fn set_delay_millis(&mut self, millis: i64) -> Result<(), SimulationError> {
        if millis <= 0 {
            return Err(SimulationError::InvalidDelay(millis));
        }
        self.delay = Duration::from_millis(millis as u64);
        info!("Delay set to {millis} ms");
        Ok(())
    }

    pub fn delay_millis(&self) -> i64 {
        i64::try_from(self.delay.as_millis()).unwrap_or(i64::MAX)
    }

    /// Marks a cell live in the pattern. Ignored outside editing mode.
    pub fn paint(&mut self, position: Coord) -> bool {
        self.mode == Mode::Editing && self.pattern.insert(position)
    }

    pub fn erase(&mut self, position: Coord) -> bool {
        self.mode == Mode::Editing && self.pattern.remove(&position)
    }

    /// Paints each cell of the inclusive `min..=max` rectangle with probability `density`.
    pub fn seed_random_soup(&mut self, min: Coord, max: Coord, density: f64) -> usize {
        if self.mode != Mode::Editing {
            return 0;
        }
        let mut painted = 0;
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                if self.rand.next_bool(density) && self.pattern.insert(Coord::new(x, y)) {
                    painted += 1;
                }
            }
        }
        debug!("Random soup painted {painted} cells");
        painted
    }

    /// Starts a continuous run, or pauses/resumes one already underway.
    pub fn toggle_run(&mut self) -> Result<(), SimulationError> {
        match self.mode {
            Mode::Editing => {
                self.load_pattern()?;
                self.mode = Mode::Running;
            }
            Mode::Running => self.mode = Mode::Paused,
            Mode::Paused => self.mode = Mode::Running,
        }
        info!("Simulation {:?}", self.mode);
        Ok(())
    }

    /// Advances exactly one generation and leaves the run paused.
    pub fn step_once(&mut self) -> Result<(), SimulationError> {
        if self.mode == Mode::Editing {
            self.load_pattern()?;
        }
        self.grid.step();
        self.mode = Mode::Paused;
        Ok(())
    }

    /// Timer tick. Steps only while running.
    pub fn advance(&mut self) -> bool {
        if self.mode != Mode::Running {
            return false;
        }
        self.grid.step();
        true
    }

    /// Clears the engine and the pattern and returns to editing.
    pub fn end_run(&mut self) {
        self.grid.clear();
        self.pattern.clear();
        self.mode = Mode::Editing;
        info!("Simulation ended");
    }

    fn load_pattern(&mut self) -> Result<(), SimulationError> {
        self.grid.init(&self.pattern)?;
        Ok(())
    }

    /// Calls `f` with each cell that should be drawn: the pattern while
    /// editing, the engine's live cells otherwise.
    pub fn for_each_visible_cell<F>(&self, mut f: F)
    where
        F: FnMut(Coord),
    {
        match self.mode {
            Mode::Editing => self.pattern.iter().copied().for_each(&mut f),
            Mode::Running | Mode::Paused => self.grid.live_cells().for_each(&mut f),
        }
    }

    pub fn bounding_box(&self) -> Option<(Coord, Coord)> {
        match self.mode {
            Mode::Editing => bounding_box(self.pattern.iter().copied()),
            Mode::Running | Mode::Paused => self.grid.bounding_box(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blinker() -> Vec<Coord> {
        vec![Coord::new(1, 0), Coord::new(1, 1), Coord::new(1, 2)]
    }

    fn visible(simulation: &Simulation) -> HashSet<Coord> {
        let mut cells = HashSet::new();
        simulation.for_each_visible_cell(|coord| {
            cells.insert(coord);
        });
        cells
    }

    #[test]
    fn rejects_non_positive_delay() {
        let mut simulation = Simulation::new(Random::from_seed(1));
        simulation.set_delay_millis(250).unwrap();
        assert!(matches!(
            simulation.set_delay_millis(0),
            Err(SimulationError::InvalidDelay(0))
        ));
        assert!(simulation.set_delay_millis(-5).is_err());
        assert_eq!(simulation.delay(), Duration::from_millis(250));
    }

    #[test]
    fn paints_only_while_editing() {
        let mut simulation = Simulation::new(Random::from_seed(1));
        assert!(simulation.paint(Coord::new(0, 0)));
        assert!(!simulation.paint(Coord::new(0, 0)));
        simulation.toggle_run().unwrap();
        assert!(!simulation.paint(Coord::new(5, 5)));
        assert!(!simulation.erase(Coord::new(0, 0)));
    }

    #[test]
    fn run_starts_from_the_painted_pattern() {
        let mut simulation = Simulation::new(Random::from_seed(1)).with_pattern(blinker());
        assert!(!simulation.advance());

        simulation.toggle_run().unwrap();
        assert_eq!(simulation.mode(), Mode::Running);
        assert!(simulation.advance());
        assert_eq!(
            visible(&simulation),
            HashSet::from([Coord::new(0, 1), Coord::new(1, 1), Coord::new(2, 1)])
        );

        simulation.toggle_run().unwrap();
        assert_eq!(simulation.mode(), Mode::Paused);
        assert!(!simulation.advance());
        assert_eq!(simulation.grid().generation(), 1);
    }

    #[test]
    fn single_steps_continue_the_same_run() {
        let mut simulation = Simulation::new(Random::from_seed(1)).with_pattern(blinker());
        simulation.step_once().unwrap();
        simulation.step_once().unwrap();
        assert_eq!(simulation.mode(), Mode::Paused);
        assert_eq!(simulation.grid().generation(), 2);
        assert_eq!(visible(&simulation), blinker().into_iter().collect());
    }

    #[test]
    fn end_run_returns_to_an_empty_editor() {
        let mut simulation = Simulation::new(Random::from_seed(1)).with_pattern(blinker());
        simulation.toggle_run().unwrap();
        simulation.end_run();
        simulation.end_run();
        assert_eq!(simulation.mode(), Mode::Editing);
        assert!(simulation.grid().is_empty());
        assert!(visible(&simulation).is_empty());
        assert!(simulation.paint(Coord::new(3, 3)));
    }

    #[test]
    fn soup_stays_inside_the_area() {
        let mut simulation = Simulation::new(Random::from_seed(42));
        let painted = simulation.seed_random_soup(Coord::new(-2, -2), Coord::new(2, 2), 1.0);
        assert_eq!(painted, 25);
        assert_eq!(
            simulation.bounding_box(),
            Some((Coord::new(-2, -2), Coord::new(2, 2)))
        );
    }
}

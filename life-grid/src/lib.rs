#![deny(clippy::all)]
#![forbid(unsafe_code)]

use arrayvec::ArrayVec;
use log::{debug, trace};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Conway's Life on an unbounded plane, stored as the set of live cells only.
///
/// A coordinate is a key of `cells` if and only if that cell is alive in the
/// current generation. Every cell's `neighbor_count` is refreshed after each
/// `init` and `step`, so it always describes the current generation.
#[derive(Clone, Debug, Default)]
pub struct LifeGrid {
    cells: HashMap<Coord, Cell>,
    generation: u64,
}

impl LifeGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the live cells with one cell per distinct coordinate.
    ///
    /// Every coordinate is validated before anything changes, so on
    /// `GridError::InvalidInput` the previous generation is left intact.
    pub fn init<I>(&mut self, initial_coords: I) -> Result<(), GridError>
    where
        I: IntoIterator,
        I::Item: TryInto<Coord>,
        GridError: From<<I::Item as TryInto<Coord>>::Error>,
    {
        let coords = initial_coords
            .into_iter()
            .map(|item| item.try_into().map_err(GridError::from))
            .collect::<Result<Vec<Coord>, GridError>>()?;

        self.cells = coords
            .into_iter()
            .map(|position| (position, Cell::new(position)))
            .collect();
        self.generation = 0;
        self.refresh_neighbor_counts();
        debug!("Initialized grid with {} live cells", self.population());
        Ok(())
    }

    /// Advances exactly one generation.
    pub fn step(&mut self) {
        let (births, deaths) = self.decide_fates();

        for position in &deaths {
            self.cells.remove(position);
        }
        for &position in &births {
            self.cells.insert(position, Cell::new(position));
        }
        self.refresh_neighbor_counts();
        self.generation += 1;

        debug!(
            "Generation {}: {} births, {} deaths, {} live",
            self.generation,
            births.len(),
            deaths.len(),
            self.population()
        );
    }

    // Reads only the current generation; nothing is applied until every fate is known.
    fn decide_fates(&self) -> (Vec<Coord>, Vec<Coord>) {
        let mut births = Vec::new();
        let mut deaths = Vec::new();
        let mut examined = HashSet::new();

        for cell in self.cells.values() {
            if !cell.survives() {
                deaths.push(cell.position);
            }

            for candidate in cell.position.neighbor_positions() {
                if self.cells.contains_key(&candidate) || !examined.insert(candidate) {
                    continue;
                }
                if Cell::is_born(self.live_neighbor_count(candidate)) {
                    births.push(candidate);
                }
            }
        }
        trace!("Examined {} birth candidates", examined.len());
        (births, deaths)
    }

    fn refresh_neighbor_counts(&mut self) {
        let counts: Vec<(Coord, u8)> = self
            .cells
            .keys()
            .map(|&position| (position, self.live_neighbor_count(position)))
            .collect();
        for (position, count) in counts {
            if let Some(cell) = self.cells.get_mut(&position) {
                cell.neighbor_count = count;
            }
        }
    }

    fn live_neighbor_count(&self, position: Coord) -> u8 {
        self.neighbors_of(position).len() as u8
    }

    /// The live cells among the 8 positions surrounding `position`.
    pub fn neighbors_of(&self, position: Coord) -> ArrayVec<&Cell, 8> {
        position
            .neighbor_positions()
            .filter_map(|neighbor| self.cells.get(&neighbor))
            .collect()
    }

    pub fn live_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.keys().copied()
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.values()
    }

    pub fn cell(&self, position: Coord) -> Option<&Cell> {
        self.cells.get(&position)
    }

    pub fn is_alive(&self, position: Coord) -> bool {
        self.cells.contains_key(&position)
    }

    pub fn population(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of steps taken since the last `init` or `clear`.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The (min, max) corners of the smallest rectangle holding every live cell.
    pub fn bounding_box(&self) -> Option<(Coord, Coord)> {
        bounding_box(self.live_cells())
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.generation = 0;
    }
}

pub fn bounding_box<I>(positions: I) -> Option<(Coord, Coord)>
where
    I: IntoIterator<Item = Coord>,
{
    let mut positions = positions.into_iter();
    let first = positions.next()?;
    Some(positions.fold((first, first), |(min, max), pos| {
        (
            Coord::new(min.x.min(pos.x), min.y.min(pos.y)),
            Coord::new(max.x.max(pos.x), max.y.max(pos.y)),
        )
    }))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    position: Coord,
    neighbor_count: u8,
}

impl Cell {
    fn new(position: Coord) -> Self {
        Self {
            position,
            neighbor_count: 0,
        }
    }

    pub fn position(&self) -> Coord {
        self.position
    }

    pub fn neighbor_count(&self) -> u8 {
        self.neighbor_count
    }

    fn survives(&self) -> bool {
        matches!(self.neighbor_count, 2 | 3)
    }

    fn is_born(neighbor_count: u8) -> bool {
        neighbor_count == 3
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub x: i64,
    pub y: i64,
}

impl Coord {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// None when the offset position falls off the edge of `i64`.
    pub fn offset(self, dx: i64, dy: i64) -> Option<Coord> {
        Some(Coord::new(self.x.checked_add(dx)?, self.y.checked_add(dy)?))
    }

    /// The Moore neighborhood, excluding `self`.
    pub fn neighbor_positions(self) -> impl Iterator<Item = Coord> {
        NEIGHBOR_OFFSETS
            .into_iter()
            .filter_map(move |(dx, dy)| self.offset(dx, dy))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for Coord {
    type Err = GridError;

    /// Parses `"x,y"`, e.g. `"3,-4"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| GridError::invalid_input(format!("expected x,y but got {s:?}")))?;
        Ok(Coord::new(parse_component(x, s)?, parse_component(y, s)?))
    }
}

fn parse_component(component: &str, whole: &str) -> Result<i64, GridError> {
    component.trim().parse().map_err(|_| {
        GridError::invalid_input(format!(
            "{:?} in {whole:?} is not an integer",
            component.trim()
        ))
    })
}

impl From<(i64, i64)> for Coord {
    fn from((x, y): (i64, i64)) -> Self {
        Coord::new(x, y)
    }
}

impl From<&Coord> for Coord {
    fn from(coord: &Coord) -> Self {
        *coord
    }
}

impl TryFrom<(f64, f64)> for Coord {
    type Error = GridError;

    fn try_from((x, y): (f64, f64)) -> Result<Self, Self::Error> {
        Ok(Coord::new(whole_number(x)?, whole_number(y)?))
    }
}

fn whole_number(value: f64) -> Result<i64, GridError> {
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
    if value.is_finite()
        && value.trunc() == value
        && value >= i64::MIN as f64
        && value < i64::MAX as f64
    {
        Ok(value as i64)
    } else {
        Err(GridError::invalid_input(format!(
            "coordinate {value} is not an integer"
        )))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
}

impl GridError {
    fn invalid_input(reason: String) -> Self {
        GridError::InvalidInput { reason }
    }
}

impl From<Infallible> for GridError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

#[derive(Debug)]
pub struct Random {
    rng: SmallRng,
}

impl Random {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_rng(&mut rand::rng()),
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn next_bool(&mut self, p: f64) -> bool {
        self.rng.random_bool(p)
    }
}

impl Default for Random {
    fn default() -> Self {
        Self::new()
    }
}

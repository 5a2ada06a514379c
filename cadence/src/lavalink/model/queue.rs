use std::{collections::VecDeque, time::Duration};

use lavalink_rs::model::track::TrackData;
use rand::seq::SliceRandom;
use twilight_model::id::{marker::UserMarker, Id};

/// Repeat behaviour when a track finishes naturally, cycled
/// `Off -> Track -> Queue -> Off` by the `/loop` command and the
/// controller's repeat button.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RepeatMode {
    Off,
    Track,
    Queue,
}

impl RepeatMode {
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Off => Self::Track,
            Self::Track => Self::Queue,
            Self::Queue => Self::Off,
        }
    }

    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Off => "➡️",
            Self::Track => "🔂",
            Self::Queue => "🔁",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Off => "Loop disabled",
            Self::Track => "Looping the current track",
            Self::Queue => "Looping the queue",
        }
    }
}

impl std::fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

#[derive(Debug, Clone)]
pub struct Item {
    data: TrackData,
    requester: Id<UserMarker>,
    enqueued: Duration,
}

impl Item {
    #[must_use]
    pub fn new(data: TrackData, requester: Id<UserMarker>) -> Self {
        Self {
            data,
            requester,
            enqueued: cadence_ext::unix_time(),
        }
    }

    #[must_use]
    pub const fn data(&self) -> &TrackData {
        &self.data
    }

    #[must_use]
    pub const fn requester(&self) -> Id<UserMarker> {
        self.requester
    }

    #[must_use]
    pub const fn enqueued(&self) -> Duration {
        self.enqueued
    }
}

/// The playback queue: the current item plus the upcoming items in
/// insertion order. User-facing positions are 1-based indices into the
/// upcoming items.
pub struct Queue {
    current: Option<Item>,
    upcoming: VecDeque<Item>,
    repeat_mode: RepeatMode,
}

impl Queue {
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: None,
            upcoming: VecDeque::new(),
            repeat_mode: RepeatMode::Off,
        }
    }

    #[must_use]
    pub const fn current(&self) -> Option<&Item> {
        self.current.as_ref()
    }

    #[must_use]
    pub const fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }

    pub const fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.repeat_mode = mode;
    }

    #[must_use]
    pub fn upcoming(&self) -> impl ExactSizeIterator<Item = &Item> {
        self.upcoming.iter()
    }

    /// Upcoming count; the current track is not included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.upcoming.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.upcoming.is_empty()
    }

    /// Total of current + upcoming, for queue-position displays.
    #[must_use]
    pub fn total_len(&self) -> usize {
        usize::from(self.current.is_some()) + self.upcoming.len()
    }

    pub fn enqueue(&mut self, item: Item) {
        self.upcoming.push_back(item);
    }

    /// Moves the queue forward after a track ends, returning what should
    /// play next.
    ///
    /// A natural end honours the repeat mode; a forced advance (skip)
    /// always moves on.
    pub fn advance(&mut self, natural: bool) -> Option<&Item> {
        if natural {
            match self.repeat_mode {
                RepeatMode::Track => return self.current.as_ref(),
                RepeatMode::Queue => {
                    if let Some(finished) = self.current.take() {
                        self.upcoming.push_back(finished);
                    }
                }
                RepeatMode::Off => {
                    self.current = None;
                }
            }
        }
        self.current = self.upcoming.pop_front();
        self.current.as_ref()
    }

    /// Removes the upcoming item at the 1-based `position`.
    pub fn remove(&mut self, position: usize) -> Option<Item> {
        if position == 0 {
            return None;
        }
        self.upcoming.remove(position - 1)
    }

    /// Moves the upcoming item at 1-based `from` to 1-based `to`.
    pub fn shift(&mut self, from: usize, to: usize) -> Option<&Item> {
        if from == 0 || to == 0 || to > self.upcoming.len() {
            return None;
        }
        let item = self.upcoming.remove(from - 1)?;
        self.upcoming.insert(to - 1, item);
        self.upcoming.get(to - 1)
    }

    pub fn clear(&mut self) {
        self.upcoming.clear();
    }

    pub fn shuffle(&mut self, rng: &mut impl rand::Rng) {
        self.upcoming.make_contiguous().shuffle(rng);
    }

    /// Current + upcoming, in play order, for snapshotting into a
    /// persisted playlist.
    pub fn iter_all(&self) -> impl Iterator<Item = &Item> {
        self.current.iter().chain(self.upcoming.iter())
    }
}

impl Default for Queue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;

    use lavalink_rs::model::track::{TrackData, TrackInfo};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use twilight_model::id::Id;

    use super::{Item, Queue, RepeatMode};

    fn item(title: &str) -> Item {
        let info = TrackInfo {
            identifier: format!("id-{title}"),
            is_seekable: true,
            author: "Artist".to_owned(),
            length: 60_000,
            is_stream: false,
            position: 0,
            title: title.to_owned(),
            uri: None,
            artwork_url: None,
            isrc: None,
            source_name: "youtube".to_owned(),
        };
        Item::new(
            TrackData {
                encoded: String::new(),
                info,
                plugin_info: None,
                user_data: None,
            },
            Id::new(1),
        )
    }

    fn queue_of(titles: &[&str]) -> Queue {
        let mut queue = Queue::new();
        for title in titles {
            queue.enqueue(item(title));
        }
        queue.advance(true);
        queue
    }

    fn title(item: Option<&Item>) -> Option<&str> {
        item.map(|i| i.data().info.title.as_str())
    }

    #[test]
    fn advancing_moves_through_in_insertion_order() {
        let mut queue = queue_of(&["a", "b", "c"]);
        assert_eq!(title(queue.current()), Some("a"));
        assert_eq!(title(queue.advance(true)), Some("b"));
        assert_eq!(title(queue.advance(true)), Some("c"));
        assert_eq!(title(queue.advance(true)), None);
    }

    #[test]
    fn track_repeat_replays_on_natural_end_only() {
        let mut queue = queue_of(&["a", "b"]);
        queue.set_repeat_mode(RepeatMode::Track);

        assert_eq!(title(queue.advance(true)), Some("a"));
        assert_eq!(title(queue.advance(true)), Some("a"));
        // a skip moves on regardless
        assert_eq!(title(queue.advance(false)), Some("b"));
    }

    #[test]
    fn queue_repeat_recycles_finished_tracks() {
        let mut queue = queue_of(&["a", "b"]);
        queue.set_repeat_mode(RepeatMode::Queue);

        assert_eq!(title(queue.advance(true)), Some("b"));
        assert_eq!(title(queue.advance(true)), Some("a"));
        assert_eq!(title(queue.advance(true)), Some("b"));
        assert_eq!(queue.total_len(), 2);
    }

    #[rstest]
    #[case(0, None)]
    #[case(3, None)]
    #[case(1, Some("b"))]
    #[case(2, Some("c"))]
    fn removal_is_one_based_and_bounded(#[case] position: usize, #[case] expected: Option<&str>) {
        let mut queue = queue_of(&["a", "b", "c"]);
        let removed = queue.remove(position);
        assert_eq!(removed.as_ref().map(|i| i.data().info.title.as_str()), expected);
    }

    #[test]
    fn shuffling_preserves_the_upcoming_multiset() {
        let mut queue = queue_of(&["a", "b", "c", "d", "e", "f"]);
        let before = queue
            .upcoming()
            .map(|i| i.data().info.title.clone())
            .collect::<BTreeSet<_>>();

        queue.shuffle(&mut rand::rng());

        let after = queue
            .upcoming()
            .map(|i| i.data().info.title.clone())
            .collect::<BTreeSet<_>>();
        assert_eq!(before, after);
        assert_eq!(title(queue.current()), Some("a"));
    }

    #[test]
    fn shifting_reorders_upcoming() {
        let mut queue = queue_of(&["a", "b", "c", "d"]);
        assert!(queue.shift(3, 1).is_some());
        let order = queue
            .upcoming()
            .map(|i| i.data().info.title.as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, ["d", "b", "c"]);
    }

    #[test]
    fn snapshot_order_is_current_then_upcoming() {
        let queue = queue_of(&["a", "b", "c"]);
        let all = queue
            .iter_all()
            .map(|i| i.data().info.title.as_str())
            .collect::<Vec<_>>();
        assert_eq!(all, ["a", "b", "c"]);
    }
}

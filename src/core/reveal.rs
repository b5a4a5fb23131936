//! Paced "typing" presentation of an already complete response.
//!
//! A [`Reveal`] is a [`Stream`] of growing prefixes of its text, one step per
//! timer tick. It owns its interval; dropping it or cancelling its token stops
//! the timer, so nothing is emitted onto a surface that has gone away.

use std::fmt;
use std::future::poll_fn;
use std::ops::Range;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::Stream;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::core::constants::{DEFAULT_REVEAL_CHARS_PER_TICK, DEFAULT_REVEAL_INTERVAL_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealConfig {
    pub chars_per_tick: usize,
    pub tick_interval: Duration,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            chars_per_tick: DEFAULT_REVEAL_CHARS_PER_TICK,
            tick_interval: Duration::from_millis(DEFAULT_REVEAL_INTERVAL_MS),
        }
    }
}

impl RevealConfig {
    pub fn new(chars_per_tick: usize, tick_interval: Duration) -> Self {
        Self {
            chars_per_tick,
            tick_interval,
        }
    }

    /// Reveal everything on the first tick.
    pub fn instant() -> Self {
        Self {
            chars_per_tick: usize::MAX,
            tick_interval: Duration::from_millis(1),
        }
    }
}

/// The reveal was cancelled before the full text was shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealInterrupted {
    /// Characters visible when the timer stopped.
    pub shown_chars: usize,
}

impl fmt::Display for RevealInterrupted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reveal interrupted after {} characters", self.shown_chars)
    }
}

impl std::error::Error for RevealInterrupted {}

pub struct Reveal {
    text: String,
    // Byte offset where each character ends, so prefix k is text[..ends[k - 1]].
    char_ends: Vec<usize>,
    shown: usize,
    per_tick: usize,
    ticker: Interval,
    cancel: CancellationToken,
}

/// Start revealing `text`. The first prefix appears one interval from now.
pub fn reveal(text: impl Into<String>, config: RevealConfig, cancel: CancellationToken) -> Reveal {
    let text = text.into();
    let char_ends = text
        .char_indices()
        .map(|(start, ch)| start + ch.len_utf8())
        .collect();
    // tokio intervals panic on a zero period.
    let period = config.tick_interval.max(Duration::from_millis(1));
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    Reveal {
        text,
        char_ends,
        shown: 0,
        per_tick: config.chars_per_tick.max(1),
        ticker,
        cancel,
    }
}

impl Reveal {
    pub fn total_chars(&self) -> usize {
        self.char_ends.len()
    }

    pub fn shown_chars(&self) -> usize {
        self.shown
    }

    pub fn is_finished(&self) -> bool {
        self.shown >= self.total_chars()
    }

    fn prefix(&self, chars: usize) -> &str {
        match chars {
            0 => "",
            n => &self.text[..self.char_ends[n - 1]],
        }
    }

    /// Drive the reveal to the end, handing each prefix to `on_prefix`.
    /// Resolves with the full text, or reports how far it got if cancelled.
    pub async fn run<F>(self, mut on_prefix: F) -> Result<String, RevealInterrupted>
    where
        F: FnMut(&str),
    {
        self.drive(|text, step| on_prefix(&text[..step.end])).await
    }

    /// Like [`Reveal::run`], but hands over only the newly shown text.
    pub async fn run_deltas<F>(self, mut on_delta: F) -> Result<String, RevealInterrupted>
    where
        F: FnMut(&str),
    {
        self.drive(|text, step| on_delta(&text[step])).await
    }

    async fn drive<F>(mut self, mut on_step: F) -> Result<String, RevealInterrupted>
    where
        F: FnMut(&str, Range<usize>),
    {
        let cancel = self.cancel.clone();
        loop {
            let step = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                step = poll_fn(|cx| self.poll_step(cx)) => step,
            };
            match step {
                Some(step) => on_step(&self.text, step),
                None => break,
            }
        }

        if self.is_finished() && !cancel.is_cancelled() {
            Ok(self.text)
        } else {
            Err(RevealInterrupted {
                shown_chars: self.shown,
            })
        }
    }

    /// Wait for the next tick and advance. Yields the byte range that
    /// became visible.
    fn poll_step(&mut self, cx: &mut Context<'_>) -> Poll<Option<Range<usize>>> {
        if self.is_finished() || self.cancel.is_cancelled() {
            return Poll::Ready(None);
        }

        match self.ticker.poll_tick(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(_) => {
                if self.cancel.is_cancelled() {
                    return Poll::Ready(None);
                }
                let start = self.prefix(self.shown).len();
                self.shown = self
                    .shown
                    .saturating_add(self.per_tick)
                    .min(self.total_chars());
                Poll::Ready(Some(start..self.prefix(self.shown).len()))
            }
        }
    }
}

impl Stream for Reveal {
    type Item = String;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        this.poll_step(cx)
            .map(|step| step.map(|step| this.text[..step.end].to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    fn one_char(interval_ms: u64) -> RevealConfig {
        RevealConfig::new(1, Duration::from_millis(interval_ms))
    }

    #[tokio::test(start_paused = true)]
    async fn emits_each_prefix_in_order_then_resolves() {
        let start = Instant::now();
        let mut seen = Vec::new();
        let full = reveal("abc", one_char(30), CancellationToken::new())
            .run(|prefix| seen.push(prefix.to_string()))
            .await
            .unwrap();

        assert_eq!(seen, vec!["a", "ab", "abc"]);
        assert_eq!(full, "abc");
        assert!(start.elapsed() >= Duration::from_millis(90));
    }

    #[tokio::test(start_paused = true)]
    async fn prefixes_grow_monotonically_and_stay_bounded() {
        let text = "Monthly payment: 536.82 — about ₹44,000 a year";
        let total = text.chars().count();
        let prefixes: Vec<String> = reveal(text, RevealConfig::new(4, Duration::from_millis(5)), CancellationToken::new())
            .collect()
            .await;

        let mut previous = 0;
        for (tick, prefix) in prefixes.iter().enumerate() {
            let len = prefix.chars().count();
            assert!(len >= previous);
            assert!(len <= total);
            assert_eq!(len, ((tick + 1) * 4).min(total));
            assert!(text.starts_with(prefix.as_str()));
            previous = len;
        }
        assert_eq!(prefixes.last().map(String::as_str), Some(text));
    }

    #[tokio::test(start_paused = true)]
    async fn deltas_concatenate_to_the_full_text() {
        let text = "Rate ₹ 5% é";
        let mut deltas = Vec::new();
        let full = reveal(text, RevealConfig::new(3, Duration::from_millis(5)), CancellationToken::new())
            .run_deltas(|delta| deltas.push(delta.to_string()))
            .await
            .unwrap();

        assert_eq!(deltas, vec!["Rat", "e ₹", " 5%", " é"]);
        assert_eq!(deltas.concat(), full);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_text_resolves_without_emitting() {
        let mut calls = 0;
        let full = reveal("", one_char(30), CancellationToken::new())
            .run(|_| calls += 1)
            .await
            .unwrap();
        assert_eq!(full, "");
        assert_eq!(calls, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_further_emission() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let mut seen = Vec::new();

        let result = reveal("abcdef", one_char(10), cancel)
            .run(|prefix| {
                seen.push(prefix.to_string());
                if seen.len() == 2 {
                    trigger.cancel();
                }
            })
            .await;

        assert_eq!(result, Err(RevealInterrupted { shown_chars: 2 }));
        assert_eq!(seen, vec!["a", "ab"]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_stream_yields_nothing() {
        let cancel = CancellationToken::new();
        let mut stream = reveal("abc", one_char(10), cancel.clone());
        assert_eq!(stream.next().await.as_deref(), Some("a"));
        cancel.cancel();
        assert_eq!(stream.next().await, None);
        assert_eq!(stream.shown_chars(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn instant_config_shows_everything_on_first_tick() {
        let prefixes: Vec<String> = reveal("hello", RevealConfig::instant(), CancellationToken::new())
            .collect()
            .await;
        assert_eq!(prefixes, vec!["hello"]);
    }
}

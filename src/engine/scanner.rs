//! The scan loop
//!
//!     The scanner keeps a stack of frames, one per open region, with the root language at
//!     the bottom. Text that no terminator claimed is not emitted right away: it accumulates
//!     in a buffer (a source range ending at the current position) that is classified with
//!     the keyword table of whichever region owns it when the next terminator is handled.
//!
//!     Every non-root frame remembers the state the scan was in right before its begin
//!     matched. When the frame's illegal pattern fires, that state is restored, the begin
//!     match is blacklisted at its offset and scanning resumes in the parent, which then sees
//!     the opening text as ordinary content.
//!
//!     A rolled back frame leaves its trail behind: the spans between the positions it was
//!     scanning from and the matches it found there. The scan from any offset inside such a
//!     span is the same scan, so a later frame of the same mode under the same parent that
//!     starts inside the trail would end on the same illegal match. It is skipped without
//!     rescanning. Any other rollback may change what the blacklist hides, so it discards the
//!     trails recorded before it.
//!
//!     Searches are cached per pattern. A cached result stays valid while it starts at or
//!     after the current position, which keeps a scan over a region with many children close
//!     to linear.

use super::emitter::Emitter;
use super::emitter::Highlight;
use super::grammar::{Grammar, Terminator};
use super::keywords::Keywords;
use super::pattern::next_boundary;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::ops::Range;

/// Only the first hits of a word count toward relevance.
const MAX_KEYWORD_HITS: u32 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightOptions {
    /// Treat illegal patterns as if they were never declared.
    pub ignore_illegals: bool,
}

#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    events: usize,
    relevance: u32,
    hits: usize,
    buffer_start: usize,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    terminal: usize,
    start: usize,
    checkpoint: Checkpoint,
}

#[derive(Debug)]
struct Frame {
    mode: usize,
    serial: usize,
    /// `None` for the root.
    entry: Option<Entry>,
    /// `from..start` for every match found while this frame was on top.
    trail: Vec<Range<usize>>,
}

#[derive(Debug, Clone, Copy)]
enum Candidate {
    Begin(usize),
    End(usize),
    Illegal,
}

#[derive(Debug, Clone, Copy)]
struct Cached {
    from: usize,
    found: Option<(usize, usize)>,
}

pub(crate) struct Scanner<'g, 's> {
    grammar: &'g Grammar,
    source: &'s str,
    options: HighlightOptions,
    emitter: Emitter,
    stack: Vec<Frame>,
    pos: usize,
    buffer_start: usize,
    relevance: u32,
    illegal: bool,
    hits: HashMap<&'s str, u32>,
    hit_log: Vec<&'s str>,
    cache: Vec<Option<Cached>>,
    blacklist: HashSet<(usize, usize)>,
    /// Trails of rolled back frames, by parent serial and mode.
    doomed: HashMap<(usize, usize), Vec<Range<usize>>>,
    frames: usize,
    /// Bytes covered by pattern searches.
    scanned: usize,
}

impl<'g, 's> Scanner<'g, 's> {
    pub(crate) fn new(grammar: &'g Grammar, source: &'s str, options: HighlightOptions) -> Self {
        Self {
            grammar,
            source,
            options,
            emitter: Emitter::default(),
            stack: vec![Frame {
                mode: grammar.root(),
                serial: 0,
                entry: None,
                trail: Vec::new(),
            }],
            pos: 0,
            buffer_start: 0,
            relevance: 0,
            illegal: false,
            hits: HashMap::new(),
            hit_log: Vec::new(),
            cache: vec![None; grammar.terminal_count()],
            blacklist: HashSet::new(),
            doomed: HashMap::new(),
            frames: 1,
            scanned: 0,
        }
    }

    pub(crate) fn run(mut self) -> Highlight {
        self.scan();
        self.finish()
    }

    fn scan(&mut self) {
        while let Some((range, candidate)) = self.next_match() {
            let from = self.pos;
            let top = self.top();
            if top > 0 {
                self.stack[top].trail.push(from..range.start);
            }
            match candidate {
                Candidate::Begin(mode) => self.begin(mode, range),
                Candidate::End(frame) => self.end(frame, range),
                Candidate::Illegal => self.illegal(range),
            }
        }
    }

    fn finish(mut self) -> Highlight {
        log::trace!(
            "{}: {} bytes searched for {} bytes of input",
            self.grammar.name(),
            self.scanned,
            self.source.len()
        );
        self.flush(self.source.len());
        for frame in self.stack.iter().skip(1) {
            if self.grammar.mode(frame.mode).scope.is_some() {
                self.emitter.close();
            }
        }
        if self.stack.len() > 1 {
            log::trace!(
                "{}: {} regions still open at end of input",
                self.grammar.name(),
                self.stack.len() - 1
            );
        }

        Highlight {
            language: self.grammar.name().to_string(),
            relevance: self.relevance,
            illegal: self.illegal,
            nodes: self.emitter.finish(self.source),
        }
    }

    fn top(&self) -> usize {
        self.stack.len() - 1
    }

    /// The leftmost terminator of the active region. Ties go to begins, then the end, then
    /// the illegal pattern, each in declaration order.
    fn next_match(&mut self) -> Option<(Range<usize>, Candidate)> {
        let grammar = self.grammar;
        let mode = grammar.mode(self.stack[self.top()].mode);
        let mut best: Option<(Range<usize>, Candidate)> = None;

        for &child in &mode.contains {
            if starts_here(&best, self.pos) {
                return best;
            }
            let Some(begin) = grammar.mode(child).begin else {
                continue;
            };
            if let Some(range) = self.search(begin) {
                if is_better(&best, &range) {
                    best = Some((range, Candidate::Begin(child)));
                }
            }
        }

        if let Some((frame, terminal)) = self.end_terminal() {
            if let Some(range) = self.search(terminal) {
                if is_better(&best, &range) {
                    best = Some((range, Candidate::End(frame)));
                }
            }
        }

        if !self.options.ignore_illegals {
            if let Some(terminal) = mode.illegal {
                if let Some(range) = self.search(terminal) {
                    if is_better(&best, &range) {
                        best = Some((range, Candidate::Illegal));
                    }
                }
            }
        }

        best
    }

    /// The end pattern that closes the active region, with the frame that owns it.
    fn end_terminal(&self) -> Option<(usize, usize)> {
        let mut index = self.top();
        loop {
            match self.grammar.mode(self.stack[index].mode).end {
                Terminator::Pattern(terminal) => return Some((index, terminal)),
                Terminator::WithParent if index > 0 => index -= 1,
                _ => return None,
            }
        }
    }

    fn search(&mut self, terminal: usize) -> Option<Range<usize>> {
        let pos = self.pos;
        if let Some(cached) = self.cache[terminal] {
            let fresh = cached.from <= pos && cached.found.map_or(true, |(start, _)| start >= pos);
            if fresh {
                return cached.found.map(|(start, end)| start..end);
            }
        }

        let found = self.scan_from(terminal, pos);
        self.cache[terminal] = Some(Cached {
            from: pos,
            found: found.as_ref().map(|range| (range.start, range.end)),
        });
        found
    }

    /// The first acceptable match of `terminal` at or after `from`, bypassing the cache.
    fn scan_from(&mut self, terminal: usize, mut from: usize) -> Option<Range<usize>> {
        let grammar = self.grammar;
        let compiled = grammar.terminal(terminal);
        let start = from;
        let found = loop {
            if from > self.source.len() {
                break None;
            }
            match compiled.pattern.find_at(self.source, from) {
                None => break None,
                Some(range)
                    if (range.is_empty() && !compiled.allow_empty)
                        || self.blacklist.contains(&(terminal, range.start)) =>
                {
                    from = next_boundary(self.source, range.start);
                }
                Some(range) => break Some(range),
            }
        };
        self.scanned += found
            .as_ref()
            .map_or(self.source.len(), |range| range.end)
            .saturating_sub(start);
        found
    }

    /// Blacklists the match of `terminal` at `start` that was just taken from the cache.
    ///
    /// Nothing acceptable lies between the current position and `start`, so the search
    /// resumes right after it instead of starting over.
    fn skip(&mut self, terminal: usize, start: usize) {
        self.blacklist.insert((terminal, start));
        let pos = self.pos;
        let resumable = self.cache[terminal]
            .is_some_and(|cached| cached.from <= pos && cached.found.map(|(s, _)| s) == Some(start));
        if !resumable {
            self.cache[terminal] = None;
            return;
        }
        let found = self.scan_from(terminal, next_boundary(self.source, start));
        self.cache[terminal] = Some(Cached {
            from: pos,
            found: found.map(|range| (range.start, range.end)),
        });
    }

    /// Whether a frame of `child` opened here would retrace a rolled back one.
    fn is_doomed(&self, child: usize, from: usize) -> bool {
        let parent = self.stack[self.top()].serial;
        // Spans are recorded in scan order, so both their starts and ends never decrease.
        self.doomed.get(&(parent, child)).is_some_and(|trail| {
            let index = trail.partition_point(|span| span.end < from);
            trail.get(index).is_some_and(|span| span.start <= from)
        })
    }

    fn begin(&mut self, child: usize, range: Range<usize>) {
        let grammar = self.grammar;
        let mode = grammar.mode(child);

        if mode.end == Terminator::Immediate {
            if mode.exclude_begin {
                self.flush(range.end);
            } else {
                self.flush(range.start);
                if let Some(scope) = mode.scope {
                    self.emitter.open(scope);
                }
                self.classify(range.clone(), mode.keywords.as_deref());
                if mode.scope.is_some() {
                    self.emitter.close();
                }
                self.buffer_start = range.end;
            }
            self.relevance += mode.relevance;
            self.pos = range.end;
            return;
        }

        let terminal = mode.begin.unwrap_or_default();
        if self.is_doomed(child, range.end) {
            log::trace!(
                "{}: skip mode #{} at {}, it ends on a known illegal",
                grammar.name(),
                child,
                range.start
            );
            self.skip(terminal, range.start);
            return;
        }

        let checkpoint = Checkpoint {
            events: self.emitter.len(),
            relevance: self.relevance,
            hits: self.hit_log.len(),
            buffer_start: self.buffer_start,
        };
        if mode.exclude_begin {
            self.flush(range.end);
        } else {
            self.flush(range.start);
        }
        if let Some(scope) = mode.scope {
            self.emitter.open(scope);
        }

        log::trace!(
            "{}: open mode #{} at {} ({:?})",
            grammar.name(),
            child,
            range.start,
            mode.scope
        );
        self.stack.push(Frame {
            mode: child,
            serial: self.frames,
            entry: Some(Entry {
                terminal,
                start: range.start,
                checkpoint,
            }),
            trail: Vec::new(),
        });
        self.frames += 1;
        self.pos = range.end;
    }

    fn end(&mut self, matched: usize, range: Range<usize>) {
        let grammar = self.grammar;
        let origin = grammar.mode(self.stack[self.top()].mode);

        if origin.exclude_end {
            self.flush(range.start);
        } else {
            self.flush(range.end);
        }

        // A region flagged `ends_parent` closes its parent too. The root never closes.
        let mut target = matched;
        while target > 1 && grammar.mode(self.stack[target].mode).ends_parent {
            target -= 1;
        }

        while self.stack.len() > target.max(1) {
            let Some(frame) = self.stack.pop() else {
                break;
            };
            let mode = grammar.mode(frame.mode);
            if mode.scope.is_some() {
                self.emitter.close();
            }
            self.relevance += mode.relevance;
            log::trace!("{}: close mode #{} at {}", grammar.name(), frame.mode, range.end);
        }

        self.pos = range.end;
    }

    fn illegal(&mut self, range: Range<usize>) {
        match self.stack.pop() {
            Some(Frame {
                mode,
                entry: Some(entry),
                trail,
                ..
            }) => {
                log::debug!(
                    "{}: illegal {:?} at {} inside mode #{} opened at {}, rolling back",
                    self.grammar.name(),
                    &self.source[range.clone()],
                    range.start,
                    mode,
                    entry.start
                );
                self.emitter.truncate(entry.checkpoint.events);
                self.relevance = entry.checkpoint.relevance;
                while self.hit_log.len() > entry.checkpoint.hits {
                    if let Some(word) = self.hit_log.pop() {
                        if let Some(count) = self.hits.get_mut(word) {
                            *count -= 1;
                        }
                    }
                }
                self.buffer_start = entry.checkpoint.buffer_start;
                self.pos = entry.start;
                self.blacklist.insert((entry.terminal, entry.start));
                self.cache[entry.terminal] = None;

                let parent = self.stack[self.top()].serial;
                self.doomed.clear();
                self.doomed.insert((parent, mode), trail);
            }
            Some(root) => {
                self.stack.push(root);
                log::debug!(
                    "{}: illegal {:?} at {}",
                    self.grammar.name(),
                    &self.source[range.clone()],
                    range.start
                );
                self.illegal = true;
                self.flush(range.start);
                let end = if range.is_empty() {
                    next_boundary(self.source, range.end).min(self.source.len())
                } else {
                    range.end
                };
                self.emitter.text(range.start..end);
                self.buffer_start = end;
                self.pos = end;
            }
            None => {}
        }
    }

    /// Classifies the buffer up to `to` with the active region's keywords.
    fn flush(&mut self, to: usize) {
        let grammar = self.grammar;
        let keywords = grammar.mode(self.stack[self.top()].mode).keywords.as_deref();
        let range = self.buffer_start..to;
        self.buffer_start = to;
        self.classify(range, keywords);
    }

    fn classify(&mut self, range: Range<usize>, keywords: Option<&Keywords>) {
        if range.is_empty() {
            return;
        }
        let Some(keywords) = keywords else {
            self.emitter.text(range);
            return;
        };

        let source = self.source;
        let text = &source[range.clone()];
        let mut last = 0;
        for word in keywords.lexeme().find_iter(text) {
            let Some(class) = keywords.classify(word.as_str()) else {
                continue;
            };
            self.emitter.text(range.start + last..range.start + word.start());
            self.emitter.open(class.scope());
            self.emitter
                .text(range.start + word.start()..range.start + word.end());
            self.emitter.close();
            self.hit(&source[range.start + word.start()..range.start + word.end()]);
            last = word.end();
        }
        self.emitter.text(range.start + last..range.end);
    }

    fn hit(&mut self, word: &'s str) {
        let count = self.hits.entry(word).or_insert(0);
        *count += 1;
        if *count <= MAX_KEYWORD_HITS {
            self.relevance += Keywords::relevance(word);
        }
        self.hit_log.push(word);
    }
}

fn is_better(best: &Option<(Range<usize>, Candidate)>, range: &Range<usize>) -> bool {
    best.as_ref()
        .map_or(true, |(current, _)| range.start < current.start)
}

fn starts_here(best: &Option<(Range<usize>, Candidate)>, pos: usize) -> bool {
    best.as_ref()
        .is_some_and(|(current, _)| current.start == pos)
}

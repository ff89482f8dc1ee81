//! The read / dispatch / respond loop.
//!
//! One [`Session`] lives for the whole process and owns the world graph, so
//! state carries over when the engine reconnects. Connections are served one
//! at a time; each inbound line is answered before the next is read.

use crate::config::ServeConfig;
use crate::dataset::{DatasetRecorder, PurchaseRecord};
use crate::protocol::{route, Bookkeeping, Inbound, Response};
use anyhow::Context;
use std::borrow::Cow;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use tripmind_core::moves::{purchase_moves, PurchaseMove};
use tripmind_core::{
    canonical_key, encode, legal_moves, ChangeParser, MapRecord, MoveDictionary, MovePicker,
    Phase, RandomPicker, WorldGraph,
};

/// Round token before the engine announces one.
pub const NO_ROUND: &str = "0";

pub struct Session {
    graph: WorldGraph,
    parser: ChangeParser,
    dictionary: MoveDictionary,
    recorder: DatasetRecorder,
    picker: Box<dyn MovePicker>,
    episode: u32,
    round: String,
    pu_before_move: i64,
    /// Legal purchases from the last `[FOR_DB] purchase`.
    latest_purchases: Vec<PurchaseMove>,
}

impl Session {
    pub fn new(
        graph: WorldGraph,
        dictionary: MoveDictionary,
        recorder: DatasetRecorder,
        picker: Box<dyn MovePicker>,
    ) -> anyhow::Result<Self> {
        let parser = ChangeParser::new().context("Failed to compile change patterns")?;
        Ok(Self {
            graph,
            parser,
            dictionary,
            recorder,
            picker,
            episode: 1,
            round: NO_ROUND.to_string(),
            pu_before_move: 0,
            latest_purchases: Vec::new(),
        })
    }

    /// Load the map record and move dictionary named by `config`.
    pub fn from_config(config: &ServeConfig) -> anyhow::Result<Self> {
        let map_path = config
            .map_path
            .as_deref()
            .context("No map record configured (use --map)")?;
        let record = MapRecord::load(map_path)
            .with_context(|| format!("Failed to load map record {}", map_path.display()))?;
        let picker: Box<dyn MovePicker> = match config.seed {
            Some(seed) => Box::new(RandomPicker::new(seed)),
            None => Box::new(RandomPicker::from_entropy()),
        };
        Self::new(
            WorldGraph::from_record(&record),
            MoveDictionary::load(&config.move_dict_path),
            DatasetRecorder::new(&config.dataset_dir),
            picker,
        )
    }

    pub fn graph(&self) -> &WorldGraph {
        &self.graph
    }

    pub fn dictionary(&self) -> &MoveDictionary {
        &self.dictionary
    }

    pub fn episode(&self) -> u32 {
        self.episode
    }

    pub fn round(&self) -> &str {
        &self.round
    }

    /// Handle one inbound line. Blank lines get no response.
    pub fn handle_line(&mut self, line: &str) -> Option<Response> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let response = match route(line) {
            Inbound::MyMove { phase } => self.my_move(phase),
            Inbound::Round { round } => {
                self.round = round.to_string();
                if let Ok(turn) = round.parse() {
                    self.graph.set_turn(turn);
                }
                Response::ack()
            }
            Inbound::GameStopped { winner } => {
                self.end_episode(winner);
                Response::ack()
            }
            Inbound::Info => Response::ack(),
            Inbound::Bookkeeping(bookkeeping) => {
                self.bookkeeping(bookkeeping);
                Response::ack()
            }
            Inbound::Change(text) => {
                self.parser.apply(&mut self.graph, text, false);
                Response::ack()
            }
        };
        Some(response)
    }

    fn my_move(&mut self, phase_name: &str) -> Response {
        let Some(phase) = Phase::from_name(phase_name) else {
            log::warn!("Unsupported move type: {:?}", phase_name);
            return Response::pass();
        };
        let Some(player) = self.graph.controlled().map(str::to_string) else {
            log::warn!("Move requested before any role was assigned");
            return Response::pass();
        };

        if phase == Phase::Purchase {
            // A new purchase supersedes anything still pending
            self.graph.clear_unplaced(&player);
        }

        let moves = legal_moves(&self.graph, &player, phase);
        match self.picker.pick(&self.graph, &moves) {
            Some(chosen) => {
                let actions = chosen.to_actions();
                log::info!(
                    "{} {}: {} legal, sending {} actions",
                    player,
                    phase,
                    moves.len(),
                    actions.len()
                );
                Response::Actions(actions)
            }
            None => {
                log::info!("No legal {} moves available for {}", phase, player);
                Response::pass()
            }
        }
    }

    fn end_episode(&mut self, winner: &str) {
        log::info!("Episode {} finished, winner {}", self.episode, winner);
        self.graph.reset();
        self.parser.clear_pending();
        self.latest_purchases.clear();
        self.round = NO_ROUND.to_string();

        match self.recorder.archive(self.episode, winner) {
            Ok(Some(_)) => {}
            Ok(None) => log::info!("No dataset recorded for episode {}", self.episode),
            Err(e) => log::warn!("Failed to archive episode {}: {}", self.episode, e),
        }
        self.episode += 1;
    }

    fn bookkeeping(&mut self, message: Bookkeeping<'_>) {
        match message {
            Bookkeeping::Purchase { player } => {
                self.pu_before_move = self.graph.resources_of(player);
                self.latest_purchases = purchase_moves(&self.graph, player);
                let keys: Vec<String> = self
                    .latest_purchases
                    .iter()
                    .map(|m| canonical_key(&m.purchase))
                    .collect();
                if self.dictionary.register_all(keys.iter().map(String::as_str)) {
                    self.save_dictionary();
                }
                log::debug!(
                    "{} legal purchases cached for {}",
                    self.latest_purchases.len(),
                    player
                );
            }
            Bookkeeping::Chosen { player, text } => self.record_choice(player, text),
            Bookkeeping::Other { phase, player } => {
                log::debug!("Bookkeeping for {} {} ignored", phase, player);
            }
        }
    }

    fn record_choice(&mut self, player: &str, text: &str) {
        let Some(purchase) = self.parser.classifier().purchase_choice(text) else {
            log::warn!("No purchase found in chosen move {:?}", text);
            return;
        };
        let chosen = PurchaseMove::from_choice(&self.graph, player, purchase);
        if !self
            .latest_purchases
            .iter()
            .any(|m| m.purchase == chosen.purchase)
        {
            log::warn!(
                "Chosen purchase {} is not among the {} cached legal moves",
                canonical_key(&chosen.purchase),
                self.latest_purchases.len()
            );
            return;
        }

        let legal_moves: Vec<u32> = self
            .latest_purchases
            .iter()
            .map(|m| self.dictionary.id_for(&canonical_key(&m.purchase)))
            .collect();
        let chosen_move = self.dictionary.id_for(&canonical_key(&chosen.purchase));
        self.save_dictionary();

        let record = PurchaseRecord {
            round: self.round.clone(),
            player: player.to_string(),
            delegate: Phase::Purchase,
            pu_before_move: self.pu_before_move,
            pu_after_move: self.graph.resources_of(player),
            state: encode(&self.graph, Phase::Purchase),
            legal_moves,
            chosen_move,
        };
        log::info!("Saving round {} purchase for {}", self.round, player);
        if let Err(e) = self.recorder.append(self.episode, &record) {
            log::warn!("Failed to record purchase: {}", e);
        }
    }

    fn save_dictionary(&mut self) {
        if let Err(e) = self.dictionary.save() {
            log::warn!("Failed to save move dictionary: {}", e);
        }
    }

    /// Serve one connection until EOF or an I/O error.
    ///
    /// Lines that are not valid UTF-8 are decoded lossily and dispatched like
    /// any other line.
    pub fn run_connection<R: BufRead, W: Write>(
        &mut self,
        mut reader: R,
        mut writer: W,
    ) -> std::io::Result<()> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                return Ok(());
            }
            let line = String::from_utf8_lossy(&buf);
            if matches!(line, Cow::Owned(_)) {
                log::warn!("Inbound line is not valid UTF-8: {:?}", line.trim_end());
            }
            if let Some(response) = self.handle_line(&line) {
                writer.write_all(response.to_line().as_bytes())?;
                writer.write_all(b"\n")?;
                writer.flush()?;
            }
        }
    }

    /// Accept connections one after another, forever.
    ///
    /// A failed connection is logged and the next one is accepted.
    pub fn serve(&mut self, listener: &TcpListener) -> anyhow::Result<()> {
        loop {
            let (stream, addr) = match listener.accept() {
                Ok(conn) => conn,
                Err(e) => {
                    log::warn!("Error accepting connection: {}", e);
                    continue;
                }
            };
            log::info!("Engine connected from {}", addr);

            let reader = match stream.try_clone() {
                Ok(s) => BufReader::new(s),
                Err(e) => {
                    log::warn!("Cannot split connection from {}: {}", addr, e);
                    continue;
                }
            };
            match self.run_connection(reader, stream) {
                Ok(()) => log::info!("Engine at {} disconnected", addr),
                Err(e) => log::warn!("Connection to {} failed: {}", addr, e),
            }
        }
    }
}

//! Turn-scanning state machine over plenary protocol speech nodes.
//!
//! Each `rede` node is scanned child by child. A speaker line (`p
//! klasse="redner"`) opens a turn, a bare `name` child hands the floor to the
//! chair until the next speaker line, and `kommentar` interjections never
//! contribute text. Body paragraphs are collected only while a turn is open.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use plenum_core::{DateKey, MissingSpeakerPolicy, Utterance};
use roxmltree::{Document, Node, ParsingOptions};
use thiserror::Error;
use tracing::debug;

use crate::fields::Speaker;
use crate::markup::{descendant, full_text, is_named, local_name};

#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed session document: {0}")]
    Xml(#[from] roxmltree::Error),
}

/// Utterances of one floor-session document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedDocument {
    /// Sitting date declared by the root element (`sitzung-datum`), if any.
    pub session_date: Option<DateKey>,
    pub utterances: Vec<Utterance>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No open turn.
    Seeking,
    /// Accumulating paragraphs for the open turn.
    Collecting,
    /// The chair has the floor; paragraphs are discarded.
    SkippingChair,
}

/// Role of one child node of a speech node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    SpeakerIntro,
    Chair,
    Interjection,
    Paragraph,
    Other,
}

fn classify(node: Node<'_, '_>) -> Marker {
    if !node.is_element() {
        return Marker::Other;
    }
    match local_name(node) {
        "redner" => Marker::SpeakerIntro,
        "p" if node.attribute("klasse") == Some("redner")
            || descendant(node, "redner").is_some() =>
        {
            Marker::SpeakerIntro
        }
        "p" => Marker::Paragraph,
        "name" => Marker::Chair,
        "kommentar" => Marker::Interjection,
        _ => Marker::Other,
    }
}

/// Accumulates the turns of one speech node.
struct TurnScanner {
    state: State,
    speaker: Option<Speaker>,
    chunks: Vec<String>,
    turns: Vec<(Speaker, String)>,
}

impl TurnScanner {
    fn new() -> Self {
        Self {
            state: State::Seeking,
            speaker: None,
            chunks: Vec::new(),
            turns: Vec::new(),
        }
    }

    /// Start collecting without a speaker line.
    fn anonymous() -> Self {
        Self {
            state: State::Collecting,
            speaker: Some(Speaker::default()),
            ..Self::new()
        }
    }

    fn feed(&mut self, node: Node<'_, '_>) {
        match classify(node) {
            Marker::SpeakerIntro => {
                self.flush();
                self.speaker = Some(Speaker::from_marker(node));
                self.state = State::Collecting;
            }
            Marker::Chair => {
                self.flush();
                self.speaker = None;
                self.state = State::SkippingChair;
            }
            Marker::Paragraph if self.state == State::Collecting => {
                let text = full_text(node);
                let text = text.trim();
                if !text.is_empty() {
                    self.chunks.push(text.to_string());
                }
            }
            Marker::Paragraph | Marker::Interjection | Marker::Other => {}
        }
    }

    /// Emit the open turn if it has a speaker and some text.
    fn flush(&mut self) {
        let text = self.chunks.join(" ");
        self.chunks.clear();
        if let Some(speaker) = &self.speaker
            && !text.is_empty()
        {
            self.turns.push((speaker.clone(), text));
        }
    }

    fn finish(mut self) -> Vec<(Speaker, String)> {
        self.flush();
        self.turns
    }
}

/// Segments plenary protocol documents into speech turns.
#[derive(Debug, Clone, Copy, Default)]
pub struct Segmenter {
    missing_speaker: MissingSpeakerPolicy,
}

impl Segmenter {
    pub fn new(missing_speaker: MissingSpeakerPolicy) -> Self {
        Self { missing_speaker }
    }

    /// Read and segment one document.
    pub fn segment_file(&self, path: &Path) -> Result<SegmentedDocument, SegmentError> {
        let xml = std::fs::read_to_string(path).map_err(|source| SegmentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.segment_str(&xml)
    }

    /// Segment one document held in memory.
    ///
    /// Utterances come out in the order their turns started; `turn_id`s are
    /// unique within the document.
    pub fn segment_str(&self, xml: &str) -> Result<SegmentedDocument, SegmentError> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = Document::parse_with_options(xml, options)?;
        let root = doc.root_element();

        let session_date = root
            .attribute("sitzung-datum")
            .and_then(DateKey::from_session_attr);

        let mut ids = TurnIds::default();
        let mut utterances = Vec::new();

        let speeches = root.descendants().filter(|n| is_named(*n, "rede"));
        for (ordinal, speech) in speeches.enumerate() {
            let speech_id = match speech.attribute("id").map(str::trim) {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => format!("rede-{}", ordinal + 1),
            };

            let turns = self.scan_speech(speech, &speech_id);
            let multi = turns.len() > 1;
            for (seq, (speaker, text)) in turns.into_iter().enumerate() {
                let turn_id = if multi {
                    format!("{speech_id}-{:02}", seq + 1)
                } else {
                    speech_id.clone()
                };
                utterances.push(Utterance {
                    turn_id: ids.claim(turn_id),
                    speaker: speaker.name,
                    affiliation: speaker.affiliation,
                    text,
                });
            }
        }

        debug!(utterances = utterances.len(), "segmented session document");
        Ok(SegmentedDocument {
            session_date,
            utterances,
        })
    }

    fn scan_speech(&self, speech: Node<'_, '_>, speech_id: &str) -> Vec<(Speaker, String)> {
        let has_intro = speech
            .children()
            .any(|c| classify(c) == Marker::SpeakerIntro);

        let mut scanner = match (has_intro, self.missing_speaker) {
            (true, _) => TurnScanner::new(),
            (false, MissingSpeakerPolicy::EmitEmpty) => TurnScanner::anonymous(),
            (false, MissingSpeakerPolicy::Drop) => {
                debug!(speech_id, "speech without speaker line dropped");
                return Vec::new();
            }
        };

        for child in speech.children() {
            scanner.feed(child);
        }
        scanner.finish()
    }
}

/// Hands out document-unique turn ids.
#[derive(Default)]
struct TurnIds {
    seen: HashMap<String, usize>,
}

impl TurnIds {
    fn claim(&mut self, id: String) -> String {
        let mut candidate = id.clone();
        loop {
            let count = self.seen.entry(candidate.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                return candidate;
            }
            candidate = format!("{id}~{count}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn segment(xml: &str) -> Vec<Utterance> {
        Segmenter::default().segment_str(xml).unwrap().utterances
    }

    fn intro(first: &str, last: &str, party: &str) -> String {
        format!(
            r#"<p klasse="redner"><redner><name><vorname>{first}</vorname><nachname>{last}</nachname><fraktion>{party}</fraktion></name></redner>{first} {last} ({party}):</p>"#
        )
    }

    fn protocol(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE dbtplenarprotokoll SYSTEM "dbtplenarprotokoll.dtd">
<dbtplenarprotokoll sitzung-datum="01.02.2025"><sitzungsverlauf><tagesordnungspunkt top-id="TOP 1">{body}</tagesordnungspunkt></sitzungsverlauf></dbtplenarprotokoll>"#
        )
    }

    #[test]
    fn single_turn_keeps_speech_id() {
        let xml = protocol(&format!(
            r#"<rede id="ID2100100">{}<p klasse="J_1">Die Wirtschaft wächst.</p><p klasse="J">Wir handeln.</p></rede>"#,
            intro("Anna", "Beispiel", "SPD")
        ));
        let utts = segment(&xml);
        assert_eq!(utts.len(), 1);
        assert_eq!(utts[0].turn_id, "ID2100100");
        assert_eq!(utts[0].speaker, "Anna Beispiel");
        assert_eq!(utts[0].affiliation, "SPD");
        assert_eq!(utts[0].text, "Die Wirtschaft wächst. Wir handeln.");
    }

    #[test]
    fn interjections_and_chair_are_excluded() {
        let xml = protocol(&format!(
            r#"<rede id="ID1">
                {}
                <p klasse="J_1">Erster Absatz.</p>
                <kommentar>(Beifall bei der SPD)</kommentar>
                <p klasse="J">Zweiter <b>Absatz</b> mit Auszeichnung.</p>
                <kommentar>(Zuruf von der AfD: Unsinn!)</kommentar>
                <name>Präsidentin Julia Klöckner:</name>
                <p klasse="J_1">Ihre Redezeit ist abgelaufen.</p>
                <kommentar>(Heiterkeit)</kommentar>
                <p klasse="J_1">Bitte kommen Sie zum Schluss.</p>
            </rede>"#,
            intro("Anna", "Beispiel", "SPD")
        ));
        let utts = segment(&xml);
        assert_eq!(utts.len(), 1);
        assert_eq!(
            utts[0].text,
            "Erster Absatz. Zweiter Absatz mit Auszeichnung."
        );
    }

    #[test]
    fn speaker_resumes_after_chair_as_new_turn() {
        let xml = protocol(&format!(
            r#"<rede id="ID7">{}<p>Teil eins.</p><name>Vizepräsident Omid Nouripour:</name><p>Gestatten Sie eine Zwischenfrage?</p>{}<p>Frage des Kollegen.</p>{}<p>Teil zwei.</p></rede>"#,
            intro("Anna", "Beispiel", "SPD"),
            intro("Max", "Muster", "CDU/CSU"),
            intro("Anna", "Beispiel", "SPD"),
        ));
        let utts = segment(&xml);
        let ids: Vec<&str> = utts.iter().map(|u| u.turn_id.as_str()).collect();
        assert_eq!(ids, ["ID7-01", "ID7-02", "ID7-03"]);
        assert_eq!(utts[0].text, "Teil eins.");
        assert_eq!(utts[1].speaker, "Max Muster");
        assert_eq!(utts[1].text, "Frage des Kollegen.");
        assert_eq!(utts[2].text, "Teil zwei.");
    }

    #[test]
    fn intro_paragraph_text_is_not_content() {
        let xml = protocol(&format!(
            r#"<rede id="ID2">{}<p>Inhalt.</p></rede>"#,
            intro("Eva", "Test", "FDP")
        ));
        let utts = segment(&xml);
        assert!(!utts[0].text.contains("Eva Test (FDP):"));
    }

    #[test]
    fn turn_without_paragraphs_is_not_emitted() {
        let xml = protocol(&format!(
            r#"<rede id="ID3">{}<kommentar>(Beifall)</kommentar>{}<p>Nur der zweite spricht.</p></rede>"#,
            intro("Eva", "Test", "FDP"),
            intro("Max", "Muster", "SPD"),
        ));
        let utts = segment(&xml);
        assert_eq!(utts.len(), 1);
        assert_eq!(utts[0].turn_id, "ID3");
        assert_eq!(utts[0].speaker, "Max Muster");
    }

    #[test]
    fn paragraphs_before_any_marker_are_ignored() {
        let xml = protocol(&format!(
            r#"<rede id="ID4"><p>Vorlauf.</p>{}<p>Rede.</p></rede>"#,
            intro("Eva", "Test", "FDP")
        ));
        assert_eq!(segment(&xml)[0].text, "Rede.");
    }

    #[test]
    fn speech_without_intro_is_dropped_by_default() {
        let xml = protocol(r#"<rede id="ID5"><p>Niemand hat sich vorgestellt.</p></rede>"#);
        assert!(segment(&xml).is_empty());
    }

    #[test]
    fn speech_without_intro_emitted_when_configured() {
        let xml = protocol(
            r#"<rede id="ID5"><p>Ohne Vorstellung.</p><kommentar>(Beifall)</kommentar><p>Weiter.</p></rede>"#,
        );
        let doc = Segmenter::new(MissingSpeakerPolicy::EmitEmpty)
            .segment_str(&xml)
            .unwrap();
        assert_eq!(doc.utterances.len(), 1);
        let utt = &doc.utterances[0];
        assert_eq!(utt.turn_id, "ID5");
        assert_eq!(utt.speaker, "");
        assert_eq!(utt.affiliation, "");
        assert_eq!(utt.text, "Ohne Vorstellung. Weiter.");
    }

    #[test]
    fn namespaced_tags_are_matched_by_local_name() {
        let xml = r#"<bt:dbtplenarprotokoll xmlns:bt="urn:bundestag"><bt:rede id="NS1">
            <bt:p klasse="redner"><bt:redner><bt:name><bt:vorname>Ada</bt:vorname><bt:nachname>Ns</bt:nachname><bt:fraktion>SPD</bt:fraktion></bt:name></bt:redner></bt:p>
            <bt:p>Mit Namensraum.</bt:p>
            <bt:kommentar>(Beifall)</bt:kommentar>
            <bt:name>Präsidentin:</bt:name>
            <bt:p>Chair.</bt:p>
        </bt:rede></bt:dbtplenarprotokoll>"#;
        let utts = segment(xml);
        assert_eq!(utts.len(), 1);
        assert_eq!(utts[0].speaker, "Ada Ns");
        assert_eq!(utts[0].text, "Mit Namensraum.");
    }

    #[test]
    fn missing_ids_and_duplicates_stay_unique() {
        let body = format!(
            r#"<rede>{a}<p>Eins.</p></rede><rede>{a}<p>Zwei.</p></rede><rede id="X">{a}<p>Drei.</p></rede><rede id="X">{a}<p>Vier.</p></rede>"#,
            a = intro("Eva", "Test", "FDP")
        );
        let utts = segment(&protocol(&body));
        let ids: Vec<&str> = utts.iter().map(|u| u.turn_id.as_str()).collect();
        assert_eq!(ids, ["rede-1", "rede-2", "X", "X~2"]);
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn session_date_from_root_attribute() {
        let doc = Segmenter::default()
            .segment_str(&protocol(""))
            .unwrap();
        assert_eq!(doc.session_date.map(|d| d.to_string()).as_deref(), Some("01-02-2025"));
    }

    #[test]
    fn malformed_document_is_an_error() {
        let result = Segmenter::default().segment_str("<dbtplenarprotokoll><rede>");
        assert!(matches!(result, Err(SegmentError::Xml(_))));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let result = Segmenter::default().segment_file(Path::new("/nonexistent/protocol.xml"));
        assert!(matches!(result, Err(SegmentError::Read { .. })));
    }
}

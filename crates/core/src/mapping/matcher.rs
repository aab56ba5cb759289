//! Header matching for column mapping

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use super::config::MappingConfig;
use super::error::{MappingError, MappingResult};
use super::types::{ColumnMapping, FieldGap, HeaderMatch, MappedTable, MappingStats, MatchMethod};
use crate::models::{Cell, RawTable, Record};
use crate::schema::SchemaRegistry;

/// Map uploaded column headers onto canonical schema fields
///
/// Matching is deterministic: fields are visited in registry order and
/// headers in column order, so identical input always yields the identical
/// mapping.
pub struct ColumnMapper {
    registry: SchemaRegistry,
    config: MappingConfig,
}

impl ColumnMapper {
    /// Create a mapper with default config
    pub fn new(registry: SchemaRegistry) -> Self {
        Self {
            registry,
            config: MappingConfig::default(),
        }
    }

    /// Create a mapper with custom config
    pub fn with_config(registry: SchemaRegistry, config: MappingConfig) -> Self {
        Self { registry, config }
    }

    /// The registry this mapper targets
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Match headers to canonical fields
    pub fn map_headers(&self, headers: &[String]) -> MappingResult<ColumnMapping> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let synonyms = self.synonym_table()?;

        let mut state = MatchState::default();

        // Phase 1: Manual overrides
        for (header, field) in &self.config.overrides {
            if !self.registry.contains(field) {
                return Err(MappingError::UnknownField {
                    header: header.clone(),
                    field: field.clone(),
                });
            }
        }
        for (column, header) in headers.iter().enumerate() {
            let field = self
                .config
                .overrides
                .get(header)
                .or_else(|| self.config.overrides.get(header.trim()));
            if let Some(field) = field
                && !state.fields.contains(field)
            {
                state.accept(headers, column, field, MatchMethod::Override, 1.0);
            }
        }

        // Phase 2: Case-insensitive exact matches on the normalized header
        if self.config.case_insensitive {
            for (column, norm) in normalized.iter().enumerate() {
                if state.columns.contains(&column) {
                    continue;
                }
                if let Some(spec) = self.registry.field(norm)
                    && !state.fields.contains(&spec.name)
                {
                    state.accept(headers, column, &spec.name, MatchMethod::Exact, 1.0);
                }
            }
        } else {
            for (column, header) in headers.iter().enumerate() {
                if state.columns.contains(&column) {
                    continue;
                }
                if let Some(spec) = self.registry.field(header.trim())
                    && !state.fields.contains(&spec.name)
                {
                    state.accept(headers, column, &spec.name, MatchMethod::Exact, 1.0);
                }
            }
        }

        // Phase 3: Synonym table
        if self.config.use_synonyms {
            for (column, norm) in normalized.iter().enumerate() {
                if state.columns.contains(&column) {
                    continue;
                }
                if let Some(field) = synonyms.get(norm)
                    && !state.fields.contains(field)
                {
                    state.accept(headers, column, field, MatchMethod::Synonym, 0.9);
                }
            }
        }

        // Phase 4: Substring heuristic
        if self.config.substring_matching {
            for spec in self.registry.fields() {
                if state.fields.contains(&spec.name) {
                    continue;
                }
                let found = normalized.iter().enumerate().find_map(|(column, norm)| {
                    if state.columns.contains(&column) {
                        return None;
                    }
                    substring_score(norm, &spec.name, self.config.min_substring_len)
                        .map(|score| (column, score))
                });
                if let Some((column, score)) = found {
                    state.accept(headers, column, &spec.name, MatchMethod::Substring, score);
                }
            }
        }

        // Phase 5: Fuzzy matches
        if self.config.fuzzy_matching {
            for spec in self.registry.fields() {
                if state.fields.contains(&spec.name) {
                    continue;
                }

                let mut best_match: Option<(usize, usize, f64)> = None;
                for (column, norm) in normalized.iter().enumerate() {
                    if state.columns.contains(&column) || norm.is_empty() {
                        continue;
                    }
                    let distance = levenshtein_distance(norm, &spec.name);
                    if distance > self.config.max_edit_distance {
                        continue;
                    }
                    let max_len = norm.chars().count().max(spec.name.chars().count());
                    let similarity = 1.0 - (distance as f64 / max_len as f64);
                    if similarity < self.config.min_confidence {
                        continue;
                    }
                    match &best_match {
                        Some((_, best_dist, _)) if distance >= *best_dist => {}
                        _ => best_match = Some((column, distance, similarity)),
                    }
                }

                if let Some((column, _, similarity)) = best_match {
                    state.accept(headers, column, &spec.name, MatchMethod::Fuzzy, similarity);
                }
            }
        }

        let MatchState {
            mut matches,
            columns: matched_columns,
            fields: matched_fields,
        } = state;
        matches.sort_by_key(|m| m.column);

        let unmapped_headers: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(column, _)| !matched_columns.contains(column))
            .map(|(_, h)| h.clone())
            .collect();

        let gaps: Vec<FieldGap> = self
            .registry
            .fields()
            .iter()
            .filter(|spec| !matched_fields.contains(&spec.name))
            .map(|spec| FieldGap {
                field: spec.name.clone(),
                required: spec.required,
                suggestions: normalized
                    .iter()
                    .enumerate()
                    .filter(|(column, norm)| {
                        !matched_columns.contains(column)
                            && levenshtein_distance(norm, &spec.name)
                                <= self.config.max_edit_distance + 2
                    })
                    .map(|(column, _)| headers[column].clone())
                    .collect(),
            })
            .collect();

        let stats = MappingStats {
            headers: headers.len(),
            mapped: matches.len(),
            unmapped: unmapped_headers.len(),
            required_gaps: gaps.iter().filter(|g| g.required).count(),
            optional_gaps: gaps.iter().filter(|g| !g.required).count(),
        };

        debug!(
            mapped = stats.mapped,
            unmapped = stats.unmapped,
            required_gaps = stats.required_gaps,
            "Mapped column headers"
        );

        Ok(ColumnMapping {
            matches,
            unmapped_headers,
            gaps,
            stats,
        })
    }

    /// Build records from raw rows using a header mapping
    ///
    /// Every record carries every canonical field. Mapped cells are coerced
    /// against the field type; cells that cannot be coerced are kept as text
    /// for the validator to flag.
    pub fn apply(&self, mapping: &ColumnMapping, rows: &[Vec<Cell>]) -> Vec<Record> {
        rows.iter()
            .map(|row| {
                let mut record = Record::blank(&self.registry);
                for m in &mapping.matches {
                    let Some(spec) = self.registry.field(&m.field) else {
                        continue;
                    };
                    let raw = row.get(m.column).cloned().unwrap_or(Cell::Empty);
                    record.set(spec.name.clone(), spec.field_type.coerce(raw));
                }
                record
            })
            .collect()
    }

    /// Map a raw table into canonical records
    pub fn map_table(&self, table: &RawTable) -> MappingResult<MappedTable> {
        table.check_shape().map_err(MappingError::NotTabular)?;

        let mapping = self.map_headers(&table.headers)?;
        let records = self.apply(&mapping, &table.rows);
        let issues = mapping.gap_issues();

        Ok(MappedTable {
            records,
            mapping,
            issues,
        })
    }

    /// Normalized synonym -> field lookup
    ///
    /// Schema-seeded synonyms are added in registry order (first wins);
    /// configured synonyms replace them.
    fn synonym_table(&self) -> MappingResult<BTreeMap<String, String>> {
        let mut table = BTreeMap::new();
        for spec in self.registry.fields() {
            for synonym in &spec.synonyms {
                table
                    .entry(normalize_header(synonym))
                    .or_insert_with(|| spec.name.clone());
            }
        }
        for (header, field) in &self.config.synonyms {
            if !self.registry.contains(field) {
                return Err(MappingError::UnknownField {
                    header: header.clone(),
                    field: field.clone(),
                });
            }
            table.insert(normalize_header(header), field.clone());
        }
        Ok(table)
    }
}

/// Matches accepted so far, with the columns and fields they consume
#[derive(Default)]
struct MatchState {
    matches: Vec<HeaderMatch>,
    columns: HashSet<usize>,
    fields: HashSet<String>,
}

impl MatchState {
    fn accept(
        &mut self,
        headers: &[String],
        column: usize,
        field: &str,
        method: MatchMethod,
        confidence: f64,
    ) {
        self.matches.push(HeaderMatch {
            header: headers[column].clone(),
            column,
            field: field.to_string(),
            method,
            confidence,
        });
        self.columns.insert(column);
        self.fields.insert(field.to_string());
    }
}

/// Normalize a header for comparison
///
/// Lowercases and turns every run of non-alphanumeric characters into a
/// single underscore: `"Mfg. Part #"` becomes `"mfg_part"`.
pub fn normalize_header(header: &str) -> String {
    let mut out = String::with_capacity(header.len());
    let mut pending_sep = false;
    for c in header.trim().chars() {
        if c.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.extend(c.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Score a substring match between a normalized header and a field name
fn substring_score(header: &str, field: &str, min_len: usize) -> Option<f64> {
    let (shorter, longer) = if header.len() <= field.len() {
        (header, field)
    } else {
        (field, header)
    };
    if shorter.chars().count() < min_len || !longer.contains(shorter) {
        return None;
    }
    Some(shorter.len() as f64 / longer.len() as f64)
}

/// Calculate Levenshtein distance between two strings
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let len1 = s1.chars().count();
    let len2 = s2.chars().count();

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    let mut matrix = vec![vec![0usize; len2 + 1]; len1 + 1];

    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=len2 {
        matrix[0][j] = j;
    }

    for i in 1..=len1 {
        for j in 1..=len2 {
            let cost = if s1_chars[i - 1] == s2_chars[j - 1] {
                0
            } else {
                1
            };
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[len1][len2]
}

use std::{
	collections::HashSet,
	fs,
	path::{Path, PathBuf},
	time::Instant,
};

use clap::Parser;
use color_eyre::eyre;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use medrag_config::Config;
use medrag_domain::Document;
use medrag_service::{MedragService, RerankPath, RetrievalPath, SearchRequest, SearchResponse};

const DEFAULT_CONFIG_LABEL: &str = "<default>";

#[derive(Debug, Parser)]
#[command(
	version = medrag_cli::VERSION,
	rename_all = "kebab",
	styles = medrag_cli::styles(),
)]
pub struct Args {
	/// Config file for the evaluated pipeline. Built-in defaults are used when omitted.
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: Option<PathBuf>,
	/// Second config; switches to compare mode.
	#[arg(long = "config-b", value_name = "FILE")]
	pub config_b: Option<PathBuf>,
	#[arg(long, short = 'd', value_name = "FILE")]
	pub dataset: PathBuf,
	#[arg(long, value_name = "N")]
	pub top_k: Option<u32>,
	#[arg(long, value_name = "N")]
	pub rerank_top_k: Option<u32>,
	#[arg(long, value_name = "N", default_value_t = 1)]
	pub runs_per_query: u32,
}

#[derive(Debug, Deserialize)]
struct EvalDataset {
	name: Option<String>,
	defaults: Option<EvalDefaults>,
	queries: Vec<EvalQuery>,
}

#[derive(Debug, Default, Deserialize, Clone)]
struct EvalDefaults {
	top_k: Option<u32>,
	rerank_top_k: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct EvalQuery {
	id: Option<String>,
	query: String,
	documents: Vec<Document>,
	expected_titles: Vec<String>,
}

#[derive(Debug, Serialize)]
struct EvalOutput {
	dataset: EvalDatasetInfo,
	settings: EvalSettings,
	summary: EvalSummary,
	queries: Vec<QueryReport>,
}

#[derive(Debug, Serialize)]
struct EvalDatasetInfo {
	name: String,
	query_count: usize,
}

#[derive(Debug, Serialize)]
struct EvalSettings {
	config_path: String,
	top_k: u32,
	rerank_top_k: u32,
	#[serde(skip_serializing_if = "Option::is_none")]
	runs_per_query: Option<u32>,
}

#[derive(Debug, Serialize)]
struct EvalSummary {
	avg_recall_at_k: f64,
	avg_precision_at_k: f64,
	mean_rr: f64,
	mean_ndcg: f64,
	latency_ms_p50: f64,
	latency_ms_p95: f64,
	#[serde(skip_serializing_if = "Option::is_none")]
	stability: Option<StabilitySummary>,
}

#[derive(Debug, Serialize)]
struct StabilitySummary {
	runs_per_query: u32,
	avg_positional_churn_at_k: f64,
	avg_set_churn_at_k: f64,
}

#[derive(Debug, Serialize)]
struct QueryReport {
	id: String,
	query: String,
	retrieval_path: RetrievalPath,
	rerank_path: RerankPath,
	candidate_count: usize,
	expected_count: usize,
	ranked_count: usize,
	relevant_count: usize,
	recall_at_k: f64,
	precision_at_k: f64,
	rr: f64,
	ndcg: f64,
	latency_ms: f64,
	expected_titles: Vec<String>,
	ranked_titles: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	stability: Option<QueryStability>,
}

#[derive(Debug, Serialize, Clone, Copy)]
struct QueryStability {
	runs_per_query: u32,
	positional_churn_at_k: f64,
	set_churn_at_k: f64,
}

#[derive(Debug, Serialize)]
struct CompareOutput {
	dataset: EvalDatasetInfo,
	settings_a: EvalSettings,
	settings_b: EvalSettings,
	summary_a: EvalSummary,
	summary_b: EvalSummary,
	summary_delta: EvalSummaryDelta,
	policy_stability: PolicyStabilitySummary,
	queries: Vec<CompareQueryReport>,
}

#[derive(Debug, Serialize)]
struct PolicyStabilitySummary {
	k: u32,
	avg_positional_churn_at_k: f64,
	avg_set_churn_at_k: f64,
}

#[derive(Debug, Serialize)]
struct EvalSummaryDelta {
	avg_recall_at_k: f64,
	avg_precision_at_k: f64,
	mean_rr: f64,
	mean_ndcg: f64,
	latency_ms_p50: f64,
	latency_ms_p95: f64,
}

#[derive(Debug, Serialize)]
struct CompareQueryReport {
	id: String,
	query: String,
	expected_titles: Vec<String>,
	a: QueryVariant,
	b: QueryVariant,
	delta: QueryVariantDelta,
	policy_churn: PolicyChurn,
}

#[derive(Debug, Serialize)]
struct QueryVariant {
	retrieval_path: RetrievalPath,
	rerank_path: RerankPath,
	relevant_count: usize,
	recall_at_k: f64,
	rr: f64,
	ndcg: f64,
	latency_ms: f64,
	ranked_titles: Vec<String>,
}
impl From<&QueryReport> for QueryVariant {
	fn from(report: &QueryReport) -> Self {
		Self {
			retrieval_path: report.retrieval_path,
			rerank_path: report.rerank_path,
			relevant_count: report.relevant_count,
			recall_at_k: report.recall_at_k,
			rr: report.rr,
			ndcg: report.ndcg,
			latency_ms: report.latency_ms,
			ranked_titles: report.ranked_titles.clone(),
		}
	}
}

#[derive(Debug, Serialize)]
struct QueryVariantDelta {
	relevant_count: i64,
	recall_at_k: f64,
	precision_at_k: f64,
	rr: f64,
	ndcg: f64,
	latency_ms: f64,
}

#[derive(Debug, Serialize)]
struct PolicyChurn {
	positional_churn_at_k: f64,
	set_churn_at_k: f64,
}

struct Metrics {
	recall_at_k: f64,
	precision_at_k: f64,
	rr: f64,
	ndcg: f64,
	relevant_count: usize,
}

struct EvalRun {
	dataset: EvalDatasetInfo,
	settings: EvalSettings,
	summary: EvalSummary,
	queries: Vec<QueryReport>,
}

struct QueryRuns {
	first: SearchResponse,
	latency_ms: f64,
	stability: Option<QueryStability>,
}

pub fn run(args: Args) -> color_eyre::Result<()> {
	let config_a = load_config(args.config.as_deref())?;
	let filter = EnvFilter::new(config_a.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	let dataset = load_dataset(&args.dataset)?;
	let run_a = eval_config(args.config.as_deref(), config_a, &dataset, &args)?;
	let json = match &args.config_b {
		Some(config_b_path) => {
			let config_b = medrag_config::load(config_b_path)?;
			let run_b = eval_config(Some(config_b_path.as_path()), config_b, &dataset, &args)?;

			serde_json::to_string_pretty(&compare(run_a, run_b))?
		},
		None => serde_json::to_string_pretty(&EvalOutput {
			dataset: run_a.dataset,
			settings: run_a.settings,
			summary: run_a.summary,
			queries: run_a.queries,
		})?,
	};

	println!("{json}");

	Ok(())
}

fn load_config(path: Option<&Path>) -> color_eyre::Result<Config> {
	match path {
		Some(path) => Ok(medrag_config::load(path)?),
		None => Ok(Config::default()),
	}
}

fn load_dataset(path: &Path) -> color_eyre::Result<EvalDataset> {
	let raw = fs::read_to_string(path)?;

	parse_dataset(&raw)
}

fn parse_dataset(raw: &str) -> color_eyre::Result<EvalDataset> {
	let dataset: EvalDataset = serde_json::from_str(raw)?;

	if dataset.queries.is_empty() {
		return Err(eyre::eyre!("Dataset must include at least one query."));
	}

	for (index, query) in dataset.queries.iter().enumerate() {
		if query.expected_titles.is_empty() {
			return Err(eyre::eyre!(
				"Query at index {index} must include at least one expected title."
			));
		}
	}

	Ok(dataset)
}

fn eval_config(
	config_path: Option<&Path>,
	config: Config,
	dataset: &EvalDataset,
	args: &Args,
) -> color_eyre::Result<EvalRun> {
	let service = MedragService::new(config);
	let defaults = dataset.defaults.clone().unwrap_or_default();
	let top_k = args.top_k.or(defaults.top_k).unwrap_or(service.cfg.retrieval.top_k).max(1);
	let rerank_top_k =
		args.rerank_top_k.or(defaults.rerank_top_k).unwrap_or(service.cfg.rerank.top_k).max(1);
	let runs_per_query = args.runs_per_query.max(1);
	let mut reports = Vec::with_capacity(dataset.queries.len());
	let mut latencies_ms = Vec::with_capacity(dataset.queries.len());

	for (index, query) in dataset.queries.iter().enumerate() {
		let req = SearchRequest {
			query: query.query.clone(),
			documents: query.documents.clone(),
			top_k: Some(top_k),
			rerank_top_k: Some(rerank_top_k),
		};
		let runs = run_query_n_times(&service, &req, runs_per_query)?;
		let expected: HashSet<&str> = query.expected_titles.iter().map(String::as_str).collect();
		let ranked = unique_titles(&runs.first.ranked);
		let metrics = compute_metrics(&ranked, &expected);

		tracing::debug!(
			query_index = index,
			relevant = metrics.relevant_count,
			path = ?runs.first.retrieval_path,
			"Evaluated query."
		);

		reports.push(QueryReport {
			id: query.id.clone().unwrap_or_else(|| format!("query-{index}")),
			query: query.query.clone(),
			retrieval_path: runs.first.retrieval_path,
			rerank_path: runs.first.rerank_path,
			candidate_count: query.documents.len(),
			expected_count: expected.len(),
			ranked_count: ranked.len(),
			relevant_count: metrics.relevant_count,
			recall_at_k: metrics.recall_at_k,
			precision_at_k: metrics.precision_at_k,
			rr: metrics.rr,
			ndcg: metrics.ndcg,
			latency_ms: runs.latency_ms,
			expected_titles: query.expected_titles.clone(),
			ranked_titles: ranked,
			stability: runs.stability,
		});
		latencies_ms.push(runs.latency_ms);
	}

	let mut summary = summarize(&reports, &latencies_ms);
	let stability = reports.iter().filter_map(|report| report.stability).collect::<Vec<_>>();

	if !stability.is_empty() {
		let count = stability.len() as f64;

		summary.stability = Some(StabilitySummary {
			runs_per_query,
			avg_positional_churn_at_k: stability
				.iter()
				.map(|s| s.positional_churn_at_k)
				.sum::<f64>() / count,
			avg_set_churn_at_k: stability.iter().map(|s| s.set_churn_at_k).sum::<f64>() / count,
		});
	}

	Ok(EvalRun {
		dataset: EvalDatasetInfo {
			name: dataset.name.clone().unwrap_or_else(|| "eval".to_string()),
			query_count: reports.len(),
		},
		settings: EvalSettings {
			config_path: config_path
				.map(|path| path.display().to_string())
				.unwrap_or_else(|| DEFAULT_CONFIG_LABEL.to_string()),
			top_k,
			rerank_top_k,
			runs_per_query: (runs_per_query > 1).then_some(runs_per_query),
		},
		summary,
		queries: reports,
	})
}

fn run_query_n_times(
	service: &MedragService,
	req: &SearchRequest,
	runs_per_query: u32,
) -> color_eyre::Result<QueryRuns> {
	let k = req.rerank_top_k.unwrap_or(1).max(1) as usize;
	let runs = runs_per_query.max(1);
	let mut first: Option<SearchResponse> = None;
	let mut baseline = Vec::new();
	let mut latency_total_ms = 0.0_f64;
	let mut positional_churn_sum = 0.0_f64;
	let mut set_churn_sum = 0.0_f64;
	let mut churn_count = 0_u32;

	for _ in 0..runs {
		let start = Instant::now();
		let response = service.search_with(req);

		latency_total_ms += start.elapsed().as_secs_f64() * 1_000.0;

		let ranked = unique_titles(&response.ranked);

		if first.is_none() {
			baseline = ranked;
			first = Some(response);

			continue;
		}

		let (positional, set) = churn_against_baseline_at_k(&baseline, &ranked, k);

		positional_churn_sum += positional;
		set_churn_sum += set;
		churn_count += 1;
	}

	let stability = (churn_count > 0).then(|| QueryStability {
		runs_per_query: runs,
		positional_churn_at_k: positional_churn_sum / churn_count as f64,
		set_churn_at_k: set_churn_sum / churn_count as f64,
	});

	Ok(QueryRuns {
		first: first.ok_or_else(|| eyre::eyre!("No search responses were collected."))?,
		latency_ms: latency_total_ms / runs as f64,
		stability,
	})
}

fn compare(a: EvalRun, b: EvalRun) -> CompareOutput {
	let k = a.settings.rerank_top_k.min(b.settings.rerank_top_k).max(1);
	let k_usize = k as usize;
	let mut positional_sum = 0.0_f64;
	let mut set_sum = 0.0_f64;
	let queries = a
		.queries
		.iter()
		.zip(&b.queries)
		.map(|(qa, qb)| {
			let (positional_churn_at_k, set_churn_at_k) =
				churn_against_baseline_at_k(&qa.ranked_titles, &qb.ranked_titles, k_usize);

			positional_sum += positional_churn_at_k;
			set_sum += set_churn_at_k;

			CompareQueryReport {
				id: qa.id.clone(),
				query: qa.query.clone(),
				expected_titles: qa.expected_titles.clone(),
				a: QueryVariant::from(qa),
				b: QueryVariant::from(qb),
				delta: QueryVariantDelta {
					relevant_count: qb.relevant_count as i64 - qa.relevant_count as i64,
					recall_at_k: qb.recall_at_k - qa.recall_at_k,
					precision_at_k: qb.precision_at_k - qa.precision_at_k,
					rr: qb.rr - qa.rr,
					ndcg: qb.ndcg - qa.ndcg,
					latency_ms: qb.latency_ms - qa.latency_ms,
				},
				policy_churn: PolicyChurn { positional_churn_at_k, set_churn_at_k },
			}
		})
		.collect::<Vec<_>>();
	let count = queries.len().max(1) as f64;
	let summary_delta = EvalSummaryDelta {
		avg_recall_at_k: b.summary.avg_recall_at_k - a.summary.avg_recall_at_k,
		avg_precision_at_k: b.summary.avg_precision_at_k - a.summary.avg_precision_at_k,
		mean_rr: b.summary.mean_rr - a.summary.mean_rr,
		mean_ndcg: b.summary.mean_ndcg - a.summary.mean_ndcg,
		latency_ms_p50: b.summary.latency_ms_p50 - a.summary.latency_ms_p50,
		latency_ms_p95: b.summary.latency_ms_p95 - a.summary.latency_ms_p95,
	};

	CompareOutput {
		dataset: a.dataset,
		settings_a: a.settings,
		settings_b: b.settings,
		summary_a: a.summary,
		summary_b: b.summary,
		summary_delta,
		policy_stability: PolicyStabilitySummary {
			k,
			avg_positional_churn_at_k: positional_sum / count,
			avg_set_churn_at_k: set_sum / count,
		},
		queries,
	}
}

/// Fraction of the top `k` positions that differ, and of the top `k` titles missing from the
/// other ranking.
fn churn_against_baseline_at_k(baseline: &[String], other: &[String], k: usize) -> (f64, f64) {
	let k = k.max(1);
	let positional_diff = (0..k).filter(|idx| baseline.get(*idx) != other.get(*idx)).count();
	let base_set: HashSet<&String> = baseline.iter().take(k).collect();
	let other_set: HashSet<&String> = other.iter().take(k).collect();
	let overlap = base_set.intersection(&other_set).count();

	(positional_diff as f64 / k as f64, 1.0 - overlap as f64 / k as f64)
}

fn unique_titles(documents: &[Document]) -> Vec<String> {
	let mut seen = HashSet::new();
	let mut out = Vec::new();

	for doc in documents {
		if seen.insert(doc.title.as_str()) {
			out.push(doc.title.clone());
		}
	}

	out
}

fn compute_metrics(ranked: &[String], expected: &HashSet<&str>) -> Metrics {
	let mut relevant_count = 0_usize;
	let mut dcg = 0.0_f64;
	let mut first_hit = None;

	for (idx, title) in ranked.iter().enumerate() {
		if !expected.contains(title.as_str()) {
			continue;
		}

		let rank = idx + 1;

		relevant_count += 1;
		dcg += 1.0 / (rank as f64 + 1.0).log2();
		if first_hit.is_none() {
			first_hit = Some(rank);
		}
	}

	let idcg = (1..=expected.len().min(ranked.len()))
		.map(|rank| 1.0 / (rank as f64 + 1.0).log2())
		.sum::<f64>();

	Metrics {
		recall_at_k: if expected.is_empty() {
			0.0
		} else {
			relevant_count as f64 / expected.len() as f64
		},
		precision_at_k: if ranked.is_empty() {
			0.0
		} else {
			relevant_count as f64 / ranked.len() as f64
		},
		rr: first_hit.map(|rank| 1.0 / rank as f64).unwrap_or(0.0),
		ndcg: if idcg > 0.0 { dcg / idcg } else { 0.0 },
		relevant_count,
	}
}

fn summarize(reports: &[QueryReport], latencies_ms: &[f64]) -> EvalSummary {
	let count = reports.len().max(1) as f64;
	let mut sorted = latencies_ms.to_vec();

	sorted.sort_by(f64::total_cmp);

	EvalSummary {
		avg_recall_at_k: reports.iter().map(|r| r.recall_at_k).sum::<f64>() / count,
		avg_precision_at_k: reports.iter().map(|r| r.precision_at_k).sum::<f64>() / count,
		mean_rr: reports.iter().map(|r| r.rr).sum::<f64>() / count,
		mean_ndcg: reports.iter().map(|r| r.ndcg).sum::<f64>() / count,
		latency_ms_p50: percentile(&sorted, 0.50),
		latency_ms_p95: percentile(&sorted, 0.95),
		stability: None,
	}
}

/// Linear interpolation between the closest ranks of an ascending slice.
fn percentile(values: &[f64], percentile: f64) -> f64 {
	if values.is_empty() {
		return 0.0;
	}

	let pos = percentile.clamp(0.0, 1.0) * (values.len() as f64 - 1.0);
	let lower = pos.floor() as usize;
	let upper = pos.ceil() as usize;
	let weight = pos - lower as f64;

	values[lower] * (1.0 - weight) + values[upper] * weight
}

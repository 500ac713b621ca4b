pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_records.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_records.sql")),
				"tables/002_record_sequences.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_record_sequences.sql")),
				"tables/003_ranking_cache.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_ranking_cache.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}

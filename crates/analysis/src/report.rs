//! Tab-separated statistics output.
//!
//! One line per value:
//!
//! ```text
//! generation	subpopulation	statistic	chromosome	key	value
//! ```
//!
//! | statistic | key | value |
//! |---|---|---|
//! | `ancestry` | ancestry id | length-weighted proportion |
//! | `ancestry_var` | ancestry id | variance across chromosome copies |
//! | `site` | position | mutation frequency |
//! | `tract_mean` | ancestry id | mean tract length |
//! | `tract_count` | ancestry id | number of tracts |
//! | `size` | `males` / `females` | pool size (chromosome column is `-`) |
//!
//! Values are printed with six decimals so identical runs give identical
//! bytes.

use std::io::{self, Write};

use tracing::debug;
use tractsim_sim::simulation::{ReportRequest, Reporter, Simulation, Statistic, SubpopulationSnapshot};

use crate::analysis::{ancestry_variance, tract_summary};

pub const HEADER: &str = "generation\tsubpopulation\tstatistic\tchromosome\tkey\tvalue";

/// [`Reporter`] writing the text format to any writer.
pub struct TextReporter<W: Write> {
    writer: W,
    header_written: bool,
    lines: usize,
}

impl<W: Write> TextReporter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            header_written: false,
            lines: 0,
        }
    }

    /// Number of value lines written so far.
    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_header(&mut self) -> io::Result<()> {
        if !self.header_written {
            writeln!(self.writer, "{HEADER}")?;
            self.header_written = true;
        }
        Ok(())
    }

    fn line(
        &mut self,
        generation: usize,
        subpopulation: usize,
        statistic: &str,
        chromosome: &dyn std::fmt::Display,
        key: &dyn std::fmt::Display,
        value: f64,
    ) -> io::Result<()> {
        self.lines += 1;
        writeln!(
            self.writer,
            "{generation}\t{subpopulation}\t{statistic}\t{chromosome}\t{key}\t{value:.6}"
        )
    }

    fn write_snapshot(&mut self, snapshot: &SubpopulationSnapshot<'_>, statistics: &[Statistic]) -> io::Result<()> {
        let generation = snapshot.generation();
        let index = snapshot.index();
        let chromosomes = snapshot.chromosome_lengths().len();

        for statistic in statistics {
            match statistic {
                Statistic::Ancestry => {
                    for chromosome in 0..chromosomes {
                        let proportions = snapshot.ancestry_proportions(chromosome);
                        for (ancestry, &p) in proportions.iter().enumerate() {
                            self.line(generation, index, "ancestry", &chromosome, &ancestry, p)?;
                        }
                        let variances = ancestry_variance(snapshot, chromosome);
                        for (ancestry, &v) in variances.iter().enumerate() {
                            self.line(generation, index, "ancestry_var", &chromosome, &ancestry, v)?;
                        }
                    }
                }
                Statistic::Sites => {
                    for chromosome in 0..chromosomes {
                        for (position, frequency) in snapshot.site_frequencies(chromosome) {
                            self.line(generation, index, "site", &chromosome, &position, frequency)?;
                        }
                    }
                }
                Statistic::Tracts => {
                    for chromosome in 0..chromosomes {
                        let summaries = tract_summary(snapshot, chromosome);
                        for (ancestry, summary) in summaries.iter().enumerate() {
                            self.line(generation, index, "tract_mean", &chromosome, &ancestry, summary.mean_length())?;
                        }
                        for (ancestry, summary) in summaries.iter().enumerate() {
                            self.line(generation, index, "tract_count", &chromosome, &ancestry, summary.count as f64)?;
                        }
                    }
                }
                Statistic::Sizes => {
                    let size = snapshot.size();
                    self.line(generation, index, "size", &"-", &"males", size.males as f64)?;
                    self.line(generation, index, "size", &"-", &"females", size.females as f64)?;
                }
            }
        }
        Ok(())
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn report(&mut self, sim: &Simulation, request: &ReportRequest) -> io::Result<()> {
        self.write_header()?;
        let before = self.lines;
        for index in request.selected_subpopulations(sim.subpopulations().len()) {
            self.write_snapshot(&sim.snapshot(index), &request.statistics)?;
        }
        debug!(generation = request.generation, lines = self.lines - before, "statistics written");
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.write_header()?;
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tractsim_sim::simulation::{OutputEntry, SimulationBuilder};

    fn render(seed: u64) -> String {
        let mut sim = SimulationBuilder::new()
            .generations(4)
            .chromosome(1.0)
            .subpopulation(4, 4)
            .subpopulation(4, 4)
            .migration(vec![vec![0.0, 0.25], vec![0.25, 0.0]])
            .selected_site(0, 0.5, vec![(0.1, 0.5), (0.0, 0.5)])
            .allele_frequency(0, 0.5, vec![0.5, 0.0])
            .seed(seed)
            .build()
            .unwrap();
        let mut reporter = TextReporter::new(Vec::new());
        sim.run(&mut reporter).unwrap();
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_format_of_founding_generation() {
        let text = render(1);
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(HEADER));

        let founding: Vec<&str> = lines.clone().filter(|line| line.starts_with("0\t0\t")).collect();
        assert!(founding.contains(&"0\t0\tancestry\t0\t0\t1.000000"));
        assert!(founding.contains(&"0\t0\tancestry\t0\t1\t0.000000"));
        assert!(founding.contains(&"0\t0\tancestry_var\t0\t0\t0.000000"));
        assert!(founding.contains(&"0\t0\ttract_mean\t0\t0\t1.000000"));
        assert!(founding.contains(&"0\t0\ttract_count\t0\t0\t16.000000"));
        assert!(founding.contains(&"0\t0\tsize\t-\tmales\t4.000000"));
        assert!(founding.iter().any(|line| line.starts_with("0\t0\tsite\t0\t0.5\t")));

        // Every line has six columns.
        assert!(lines.all(|line| line.split('\t').count() == 6));
    }

    #[test]
    fn test_identical_seeds_give_identical_bytes() {
        assert_eq!(render(21), render(21));
    }

    #[test]
    fn test_scheduled_subset() {
        let mut sim = SimulationBuilder::new()
            .generations(10)
            .chromosome(1.0)
            .subpopulation(2, 2)
            .subpopulation(2, 2)
            .output(OutputEntry {
                generation: 1,
                statistics: vec![Statistic::Sizes],
                subpopulations: Some(vec![1]),
            })
            .output(OutputEntry {
                generation: 2,
                statistics: vec![Statistic::Sizes],
                subpopulations: None,
            })
            .seed(3)
            .build()
            .unwrap();
        let mut reporter = TextReporter::new(Vec::new());
        sim.run(&mut reporter).unwrap();
        let text = String::from_utf8(reporter.into_inner()).unwrap();

        let expected = format!("{HEADER}\n1\t1\tsize\t-\tmales\t2.000000\n1\t1\tsize\t-\tfemales\t2.000000\n");
        assert_eq!(text, expected);
    }

    #[test]
    fn test_header_written_even_without_reports() {
        let mut reporter = TextReporter::new(Vec::new());
        reporter.flush().unwrap();
        assert_eq!(String::from_utf8(reporter.into_inner()).unwrap(), format!("{HEADER}\n"));
    }
}

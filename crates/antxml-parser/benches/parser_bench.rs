use antxml_parser::{AntXmlParser, decompose};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

const FRAME_LINES: &[&str] = &[
    "\tat org.junit.Assert.fail(Assert.java:88)\n",
    "\tat org.junit.Assert.assertEquals(Assert.java:118)\n",
    "\tat sun.reflect.NativeMethodAccessorImpl.invoke0(Native Method)\n",
    "\tat com.example.widgets.WidgetTest.rendersLabel(WidgetTest.java:42)\n",
    "\tat org.junit.runners.model.FrameworkMethod$1.runReflectiveCall(FrameworkMethod.java:47)\n",
];

/// Build a stack trace body with `frames` frame lines
fn sample_trace(frames: usize) -> String {
    let mut trace = String::from("java.lang.AssertionError: expected:<1> but was:<2>\n");
    for i in 0..frames {
        trace.push_str(FRAME_LINES[i % FRAME_LINES.len()]);
    }
    trace
}

/// Build a report with `suites` suites of `cases` cases, every third case failing
fn sample_report(suites: usize, cases: usize) -> String {
    let trace = sample_trace(20).replace('<', "&lt;").replace('>', "&gt;");
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuites>\n");
    for s in 0..suites {
        xml.push_str(&format!(
            "<testsuite name=\"com.example.Suite{s}\" tests=\"{cases}\" failures=\"0\" errors=\"0\" skipped=\"0\" time=\"1.250\">\n"
        ));
        xml.push_str("<properties><property name=\"java.version\" value=\"21\"/></properties>\n");
        for c in 0..cases {
            xml.push_str(&format!(
                "<testcase name=\"case{c}\" classname=\"com.example.Suite{s}\" time=\"0.004\">"
            ));
            if c % 3 == 0 {
                xml.push_str("<failure message=\"boom\" type=\"java.lang.AssertionError\">");
                xml.push_str(&trace);
                xml.push_str("</failure>");
            }
            xml.push_str("</testcase>\n");
        }
        xml.push_str("<system-out><![CDATA[log line\n]]></system-out>\n</testsuite>\n");
    }
    xml.push_str("</testsuites>\n");
    xml
}

fn parse_benchmarks(c: &mut Criterion) {
    let parser = AntXmlParser::new();
    let mut group = c.benchmark_group("parse");

    for (suites, cases) in [(1, 10), (10, 50), (50, 200)] {
        let xml = sample_report(suites, cases);
        group.throughput(Throughput::Bytes(xml.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("report", format!("{suites}x{cases}")),
            &xml,
            |b, xml| b.iter(|| parser.parse_str(black_box(xml)).expect("parse failed")),
        );
    }

    group.finish();
}

fn decompose_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompose");

    for frames in [10, 100, 1000] {
        let trace = sample_trace(frames);
        group.throughput(Throughput::Bytes(trace.len() as u64));
        group.bench_with_input(BenchmarkId::new("frames", frames), &trace, |b, trace| {
            b.iter(|| decompose(black_box(trace)))
        });
    }

    group.finish();
}

criterion_group!(benches, parse_benchmarks, decompose_benchmarks);
criterion_main!(benches);

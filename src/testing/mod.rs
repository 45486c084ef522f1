mod pipeline_testing;

mod codec_props;
mod validation;

mod interner_props;
